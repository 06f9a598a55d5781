//! External event call node

use gork_engine::{NodeBehavior, Poll, SignalCtx};
use serde::{Deserialize, Serialize};

/// Pulls a payload and raises a named external event with it.
///
/// The host callbacks registered for the event run before the node's own
/// output fires. An unconnected payload sends a null object.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CallExternal {
    pub event: String,
}

impl CallExternal {
    pub const IN_SIGNAL: usize = 0;
    pub const IN_PAYLOAD: usize = 1;

    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
        }
    }
}

impl NodeBehavior for CallExternal {
    fn on_signal(&mut self, ctx: &mut SignalCtx<'_>, _port: usize) -> Poll {
        let payload = ctx.input(Self::IN_PAYLOAD);
        ctx.call_external_event(&self.event, &payload);
        ctx.call_port(0);
        Poll::Done
    }

    fn save_data(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn load_data(&mut self, data: &serde_json::Value) {
        match serde_json::from_value(data.clone()) {
            Ok(loaded) => *self = loaded,
            Err(e) => log::warn!("bad call-external instance data: {}", e),
        }
    }
}
