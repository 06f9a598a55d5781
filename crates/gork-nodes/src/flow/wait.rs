//! Wait node

use gork_engine::{NodeBehavior, Poll, SignalCtx, WaitReason};

/// Suspends for a pulled number of ticks, then fires its output.
///
/// The tick count is read once, when the signal arrives. Zero or negative
/// counts pass the signal through immediately.
#[derive(Debug, Default)]
pub struct Wait;

impl Wait {
    pub const IN_SIGNAL: usize = 0;
    pub const IN_TICKS: usize = 1;
}

impl NodeBehavior for Wait {
    fn on_signal(&mut self, ctx: &mut SignalCtx<'_>, _port: usize) -> Poll {
        let ticks = ctx.input(Self::IN_TICKS).as_int_lossy();
        if ticks <= 0 {
            ctx.call_port(0);
            return Poll::Done;
        }
        Poll::Waiting(WaitReason::Ticks(ticks as u64))
    }

    fn poll(&mut self, ctx: &mut SignalCtx<'_>) -> Poll {
        ctx.call_port(0);
        Poll::Done
    }
}
