//! Internal event listener node

use gork_engine::{NodeBehavior, Poll, SignalCtx};

/// Entry point for an internal event.
///
/// The node itself is inert; binding it to an event name on the graph makes
/// the reader activate it whenever that event fires, and it signals the rest
/// of its chain.
#[derive(Debug, Default)]
pub struct OnEvent;

impl NodeBehavior for OnEvent {
    fn on_signal(&mut self, ctx: &mut SignalCtx<'_>, _port: usize) -> Poll {
        ctx.call_port(0);
        Poll::Done
    }
}
