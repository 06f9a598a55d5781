//! Start node
//!
//! The conventional root of a script: hosts tag it and start it directly,
//! and it immediately signals the rest of the graph.

use gork_engine::{NodeBehavior, Poll, SignalCtx};

/// Fires its single output as soon as it is activated
#[derive(Debug, Default)]
pub struct Start;

impl NodeBehavior for Start {
    fn on_signal(&mut self, ctx: &mut SignalCtx<'_>, _port: usize) -> Poll {
        ctx.call_port(0);
        Poll::Done
    }
}
