//! Value production nodes

pub mod add;
pub mod constants;
pub mod parameter;

pub use add::Add;
pub use constants::{ConstBool, ConstFloat, ConstInt, ConstString};
pub use parameter::{ParamGet, ParamSet};
