//! Debug nodes

use gork_engine::{NodeBehavior, Poll, SignalCtx};

/// Pulls its message input and logs it at info level.
///
/// The message port is string-typed, so any producer connects through the
/// universal string fallback.
#[derive(Debug, Default)]
pub struct LogNode;

impl LogNode {
    pub const IN_SIGNAL: usize = 0;
    pub const IN_MESSAGE: usize = 1;
}

impl NodeBehavior for LogNode {
    fn on_signal(&mut self, ctx: &mut SignalCtx<'_>, _port: usize) -> Poll {
        let message = ctx.input(Self::IN_MESSAGE);
        log::info!("[{}] {}", ctx.node(), message.to_display());
        ctx.call_port(0);
        Poll::Done
    }
}
