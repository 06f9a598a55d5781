//! Internal event emitter node

use gork_engine::{NodeBehavior, Poll, SignalCtx};
use serde::{Deserialize, Serialize};

/// Fires a named internal event, then passes the signal on.
///
/// Listeners bound to the event run in the same propagation pass, after
/// anything already queued.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EmitEvent {
    pub event: String,
}

impl EmitEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
        }
    }
}

impl NodeBehavior for EmitEvent {
    fn on_signal(&mut self, ctx: &mut SignalCtx<'_>, _port: usize) -> Poll {
        ctx.trigger_internal_event(&self.event);
        ctx.call_port(0);
        Poll::Done
    }

    fn save_data(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn load_data(&mut self, data: &serde_json::Value) {
        match serde_json::from_value(data.clone()) {
            Ok(loaded) => *self = loaded,
            Err(e) => log::warn!("bad emit-event instance data: {}", e),
        }
    }
}
