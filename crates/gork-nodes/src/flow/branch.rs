//! Branch node

use gork_engine::{NodeBehavior, Poll, SignalCtx};

/// Routes an incoming signal by a pulled boolean condition.
///
/// Output 0 fires when the condition is true, output 1 when it is false.
/// An unconnected condition reads as false.
#[derive(Debug, Default)]
pub struct Branch;

impl Branch {
    pub const IN_SIGNAL: usize = 0;
    pub const IN_CONDITION: usize = 1;
    pub const OUT_TRUE: usize = 0;
    pub const OUT_FALSE: usize = 1;
}

impl NodeBehavior for Branch {
    fn on_signal(&mut self, ctx: &mut SignalCtx<'_>, _port: usize) -> Poll {
        if ctx.input(Self::IN_CONDITION).as_bool_lossy() {
            ctx.call_port(Self::OUT_TRUE);
        } else {
            ctx.call_port(Self::OUT_FALSE);
        }
        Poll::Done
    }
}
