//! Relay node

use gork_engine::{NodeBehavior, Poll, SignalCtx};

/// Forwards an incoming signal unchanged.
///
/// Useful as a junction point when several sources should feed several
/// targets through one visible hop.
#[derive(Debug, Default)]
pub struct Relay;

impl NodeBehavior for Relay {
    fn on_signal(&mut self, ctx: &mut SignalCtx<'_>, _port: usize) -> Poll {
        ctx.call_port(0);
        Poll::Done
    }
}
