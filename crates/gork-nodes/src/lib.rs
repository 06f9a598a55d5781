//! Gork Nodes
//!
//! Built-in node behaviors for the Gork graph engine.
//! Each node is an atomic building block that can be composed into scripts.
//!
//! # Categories
//!
//! - **Flow**: Control-flow routing (start, relay, branch, sequence, wait)
//! - **Value**: Constants, parameter access, arithmetic
//! - **Event**: Internal event listeners/emitters and the host boundary
//! - **Debug**: Logging

pub mod debug;
pub mod event;
pub mod flow;
pub mod setup;
pub mod value;

// Re-export all behaviors for convenience
pub use debug::LogNode;
pub use event::*;
pub use flow::*;
pub use setup::register_builtins;
pub use value::*;
