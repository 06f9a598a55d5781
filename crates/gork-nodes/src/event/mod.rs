//! Event boundary nodes

pub mod call_external;
pub mod emit_event;
pub mod on_event;

pub use call_external::CallExternal;
pub use emit_event::EmitEvent;
pub use on_event::OnEvent;
