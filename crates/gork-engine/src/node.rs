//! Nodes and the behavior contract
//!
//! A node is an execution unit: typed input/output ports, per-port connection
//! tables, tags, and a kind-specific [`NodeBehavior`]. Behaviors are plain
//! state machines — value production is synchronous, control-flow activation
//! is a polled task that can suspend across host ticks.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::connection::ConnectionTable;
use crate::graph::ValueCtx;
use crate::port::PortCollection;
use crate::reader::SignalCtx;
use crate::value::{TypeTag, Value};

/// Stable identity of a node, preserved across save/load
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generate a fresh identity
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A node instance in a graph
#[derive(Debug)]
pub struct Node {
    /// Stable identity
    pub id: NodeId,
    /// Kind identifier (references registered kind metadata)
    pub kind: String,
    /// Input ports
    pub inputs: PortCollection,
    /// Output ports
    pub outputs: PortCollection,
    /// Connections arriving at each input port
    pub inbound: ConnectionTable,
    /// Connections leaving each output port
    pub outbound: ConnectionTable,
    /// Tags for lookup (not used by execution)
    pub tags: BTreeSet<String>,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        kind: impl Into<String>,
        inputs: PortCollection,
        outputs: PortCollection,
    ) -> Self {
        Self {
            id,
            kind: kind.into(),
            inputs,
            outputs,
            inbound: ConnectionTable::new(),
            outbound: ConnectionTable::new(),
            tags: BTreeSet::new(),
        }
    }
}

/// What a behavior is waiting on while suspended.
///
/// The reader owns the wait: a tick countdown is decremented each host tick
/// and the behavior is polled when it elapses; an event wait is polled on
/// the first tick after the named internal event fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitReason {
    /// Counting down host ticks
    Ticks(u64),
    /// Waiting for a named external confirmation or event
    Event(String),
}

/// Progress reported by a behavior each time it is polled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    /// Still working; poll again next tick
    Running,
    /// Suspended on a condition; poll again next tick
    Waiting(WaitReason),
    /// Finished; the activation is released
    Done,
}

/// Kind-specific node behavior.
///
/// Every method has a default so simple kinds override only what they need.
/// The default control-flow behavior is pass-through: a signal received on
/// any input immediately pushes output 0 and completes.
pub trait NodeBehavior {
    /// Produce the value at an output port.
    ///
    /// `requested` is the producer-side type the pull protocol resolved
    /// (the output port's own type). The default warns and yields a zero.
    fn produce_value(&mut self, ctx: &ValueCtx<'_>, port: usize, requested: TypeTag) -> Value {
        log::warn!(
            "node {} has no value production for output port {}",
            ctx.node(),
            port
        );
        Value::zero(requested)
    }

    /// A signal arrived on an input port. Returns the initial progress;
    /// anything but `Done` keeps the activation registered for polling.
    fn on_signal(&mut self, ctx: &mut SignalCtx<'_>, port: usize) -> Poll {
        let _ = port;
        ctx.call_port(0);
        Poll::Done
    }

    /// Resume a suspended activation; called once per host tick.
    fn poll(&mut self, ctx: &mut SignalCtx<'_>) -> Poll {
        let _ = ctx;
        Poll::Done
    }

    /// The activation was cancelled. Invoked exactly once per cancellation
    /// so the behavior can release external resources.
    fn on_stopped(&mut self) {}

    /// Instance data for persistence
    fn save_data(&self) -> serde_json::Value {
        serde_json::Value::Null
    }

    /// Restore instance data from persistence
    fn load_data(&mut self, data: &serde_json::Value) {
        let _ = data;
    }
}

/// The framework-supplied pass-through behavior
#[derive(Debug, Default)]
pub struct PassThrough;

impl NodeBehavior for PassThrough {}
