//! Sequence node

use gork_engine::{NodeBehavior, Poll, SignalCtx};

/// Fires every output port in index order.
///
/// The kind declares no outputs; authors add custom signal ports per
/// instance, so one sequence can fan out to any number of steps. Targets
/// are queued in port order and run in that order within the same
/// propagation pass.
#[derive(Debug, Default)]
pub struct Sequence;

impl NodeBehavior for Sequence {
    fn on_signal(&mut self, ctx: &mut SignalCtx<'_>, _port: usize) -> Poll {
        let count = ctx
            .graph()
            .node(ctx.node())
            .map(|n| n.outputs.len())
            .unwrap_or(0);
        for port in 0..count {
            ctx.call_port(port);
        }
        Poll::Done
    }
}
