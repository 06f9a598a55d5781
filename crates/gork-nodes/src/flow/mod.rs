//! Control-flow nodes

pub mod branch;
pub mod relay;
pub mod sequence;
pub mod start;
pub mod wait;

pub use branch::Branch;
pub use relay::Relay;
pub use sequence::Sequence;
pub use start::Start;
pub use wait::Wait;
