//! The graph reader: signal propagation and the activation lifecycle
//!
//! A reader owns a graph and runs it cooperatively. Hosts start nodes,
//! advance time with [`GraphReader::tick`], and observe progress through an
//! [`EventSink`]. Signals fan out breadth-first through a trigger queue;
//! behaviors that cannot finish in one step suspend by returning
//! [`Poll::Waiting`] and are polled on later ticks.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::events::{EventSink, NullEventSink, ReaderEvent};
use crate::graph::{EventKind, Graph};
use crate::node::{NodeId, Poll, WaitReason};
use crate::value::{TypeTag, Value};

/// Unique identity of one activation of one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationId(Uuid);

impl ActivationId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ActivationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A pending signal delivery: activate `node` at signal input `port`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub node: NodeId,
    pub port: usize,
}

/// One live activation of a node
struct Activation {
    id: ActivationId,
    node: NodeId,
    waiting: Option<WaitReason>,
}

type Callback = Box<dyn FnMut(&Value)>;

/// Host callbacks invoked when behaviors raise external events
#[derive(Default)]
struct ExternalEvents {
    callbacks: HashMap<String, Vec<Callback>>,
}

impl ExternalEvents {
    fn register(&mut self, name: String, callback: Callback) {
        self.callbacks.entry(name).or_default().push(callback);
    }

    fn fire(&mut self, name: &str, value: &Value) {
        if let Some(callbacks) = self.callbacks.get_mut(name) {
            for callback in callbacks {
                callback(value);
            }
        }
    }
}

/// Context handed to a behavior while it handles a signal or a poll
pub struct SignalCtx<'a> {
    graph: &'a Graph,
    node: NodeId,
    queue: &'a mut VecDeque<Trigger>,
    externals: &'a mut ExternalEvents,
    fired: &'a mut Vec<String>,
}

impl<'a> SignalCtx<'a> {
    /// Identity of the node being run
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The graph the node lives in
    pub fn graph(&self) -> &Graph {
        self.graph
    }

    /// Pull the value at one of this node's own input ports
    pub fn input(&self, port: usize) -> Value {
        self.graph.pull_input(self.node, port)
    }

    /// Read a graph parameter
    pub fn param(&self, name: &str, ty: TypeTag) -> Option<Value> {
        self.graph.param(name, ty)
    }

    /// Write a graph parameter (soft on mismatch)
    pub fn set_param(&self, name: &str, ty: TypeTag, value: Value) -> bool {
        self.graph.set_param(name, ty, value)
    }

    /// Send a signal out of one of this node's output ports.
    ///
    /// Every connection on the port is queued in connection order; peers
    /// that no longer exist are skipped.
    pub fn call_port(&mut self, port: usize) {
        let Some(node) = self.graph.node(self.node) else {
            return;
        };
        for conn in node.outbound.get(port) {
            let Some(peer) = self.graph.node(conn.node) else {
                continue;
            };
            match peer.inputs.get(conn.port) {
                Some(target) if target.ty.is_signal() => {
                    self.queue.push_back(Trigger {
                        node: conn.node,
                        port: conn.port,
                    });
                }
                Some(target) => {
                    log::warn!(
                        "signal into value-typed input '{}' on node {}",
                        target.name,
                        conn.node
                    );
                }
                None => {
                    log::warn!(
                        "signal into missing input port {} on node {}",
                        conn.port,
                        conn.node
                    );
                }
            }
        }
    }

    /// Raise a declared external event, invoking host callbacks now
    pub fn call_external_event(&mut self, name: &str, value: &Value) {
        match self.graph.event_kind(name) {
            Some(EventKind::External) => self.externals.fire(name, value),
            Some(EventKind::Internal) => {
                log::warn!("'{}' is an internal event, not an external one", name);
            }
            None => log::warn!("undeclared external event '{}'", name),
        }
    }

    /// Raise a declared internal event; bound listeners activate in this
    /// same propagation pass, and activations waiting on the event wake.
    pub fn trigger_internal_event(&mut self, name: &str) {
        match self.graph.event_kind(name) {
            Some(EventKind::Internal) => self.fired.push(name.to_string()),
            Some(EventKind::External) => {
                log::warn!("'{}' is an external event, not an internal one", name);
            }
            None => log::warn!("undeclared internal event '{}'", name),
        }
    }
}

/// Owns a graph and runs it
pub struct GraphReader {
    graph: Graph,
    sink: Arc<dyn EventSink>,
    externals: ExternalEvents,
    activations: Vec<Activation>,
    queue: VecDeque<Trigger>,
    playing: bool,
}

impl GraphReader {
    /// Create a reader that discards events
    pub fn new(graph: Graph) -> Self {
        Self::with_sink(graph, Arc::new(NullEventSink))
    }

    /// Create a reader that reports through the given sink
    pub fn with_sink(graph: Graph, sink: Arc<dyn EventSink>) -> Self {
        Self {
            graph,
            sink,
            externals: ExternalEvents::default(),
            activations: Vec::new(),
            queue: VecDeque::new(),
            playing: false,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable access to the graph for live edits between ticks
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Give the graph back, dropping any run state
    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Whether any activation is live
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Number of live activations
    pub fn active_count(&self) -> usize {
        self.activations.len()
    }

    // -----------------------------------------------------------------------
    // Host boundary
    // -----------------------------------------------------------------------

    /// Register a host callback for an external event
    pub fn on_external_event(
        &mut self,
        name: impl Into<String>,
        callback: impl FnMut(&Value) + 'static,
    ) {
        self.externals.register(name.into(), Box::new(callback));
    }

    /// Register a host callback receiving the event payload as a float
    pub fn on_external_float(&mut self, name: impl Into<String>, mut f: impl FnMut(f64) + 'static) {
        self.on_external_event(name, move |v| f(v.as_float_lossy()));
    }

    /// Register a host callback receiving the event payload as an integer
    pub fn on_external_int(&mut self, name: impl Into<String>, mut f: impl FnMut(i64) + 'static) {
        self.on_external_event(name, move |v| f(v.as_int_lossy()));
    }

    /// Register a host callback receiving the event payload as a boolean
    pub fn on_external_bool(&mut self, name: impl Into<String>, mut f: impl FnMut(bool) + 'static) {
        self.on_external_event(name, move |v| f(v.as_bool_lossy()));
    }

    /// Register a host callback receiving the event payload as a string
    pub fn on_external_str(&mut self, name: impl Into<String>, mut f: impl FnMut(&str) + 'static) {
        self.on_external_event(name, move |v| f(&v.to_display()));
    }

    /// Fire an external event's host callbacks directly
    pub fn call_external_event(&mut self, name: &str, value: &Value) {
        match self.graph.event_kind(name) {
            Some(EventKind::External) => self.externals.fire(name, value),
            _ => log::warn!("undeclared external event '{}'", name),
        }
    }

    /// Fire an internal event from the host; listeners run before this
    /// call returns.
    pub fn trigger_internal_event(&mut self, name: &str) {
        if self.graph.event_kind(name) != Some(EventKind::Internal) {
            log::warn!("undeclared internal event '{}'", name);
            return;
        }
        self.process_fired(vec![name.to_string()]);
        self.drain();
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Activate a node as a root; the resulting propagation runs before
    /// this call returns, suspending only where behaviors wait.
    ///
    /// The playing level only falls on the next `tick`, so starting
    /// several roots back to back reads as one continuous run.
    pub fn start_node(&mut self, node: NodeId) -> Result<()> {
        if !self.graph.contains(node) {
            return Err(EngineError::NodeNotFound(node));
        }
        self.queue.push_back(Trigger { node, port: 0 });
        self.drain();
        Ok(())
    }

    /// Cancel every live activation of a node.
    ///
    /// Already-stopped and never-started nodes are a no-op; `on_stopped`
    /// runs once per cancelled activation.
    pub fn stop_node(&mut self, node: NodeId) {
        while let Some(pos) = self.activations.iter().position(|a| a.node == node) {
            self.cancel_activation(pos);
        }
        self.maybe_stop();
    }

    /// Cancel everything: all live activations and all queued triggers
    pub fn stop_graph(&mut self) {
        while !self.activations.is_empty() {
            self.cancel_activation(0);
        }
        self.queue.clear();
        self.maybe_stop();
    }

    /// Advance time one step: elapse tick waits, poll runnable activations,
    /// propagate any signals they raised, then re-evaluate the playing
    /// level once.
    pub fn tick(&mut self) {
        let live: Vec<ActivationId> = self.activations.iter().map(|a| a.id).collect();
        for id in live {
            let Some(pos) = self.activations.iter().position(|a| a.id == id) else {
                continue; // cancelled by an earlier poll this tick
            };
            match &mut self.activations[pos].waiting {
                Some(WaitReason::Ticks(n)) => {
                    *n = n.saturating_sub(1);
                    if *n > 0 {
                        continue;
                    }
                    self.activations[pos].waiting = None;
                }
                Some(WaitReason::Event(_)) => continue,
                None => {}
            }
            let node = self.activations[pos].node;
            let poll = self.run_behavior(node, |b, ctx| b.poll(ctx));
            self.apply_poll(id, node, poll);
        }
        self.drain();
        self.maybe_stop();
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn emit(&self, event: ReaderEvent) {
        if let Err(e) = self.sink.send(event) {
            log::warn!("event sink rejected event: {}", e);
        }
    }

    fn maybe_start(&mut self) {
        if !self.playing {
            self.playing = true;
            self.emit(ReaderEvent::GraphStarted {
                graph_id: self.graph.id().to_string(),
            });
        }
    }

    fn maybe_stop(&mut self) {
        if self.playing && self.activations.is_empty() && self.queue.is_empty() {
            self.playing = false;
            self.emit(ReaderEvent::GraphStopped {
                graph_id: self.graph.id().to_string(),
            });
        }
    }

    fn cancel_activation(&mut self, pos: usize) {
        let activation = self.activations.remove(pos);
        self.graph
            .with_behavior(activation.node, |b| b.on_stopped());
        self.emit(ReaderEvent::NodeStopped {
            node: activation.node,
            activation_id: activation.id,
        });
    }

    fn complete_activation(&mut self, id: ActivationId, node: NodeId) {
        self.activations.retain(|a| a.id != id);
        self.emit(ReaderEvent::NodeCompleted {
            node,
            activation_id: id,
        });
    }

    /// Run a behavior callback with a live signal context, then deliver any
    /// internal events it raised.
    fn run_behavior(
        &mut self,
        node: NodeId,
        f: impl FnOnce(&mut dyn crate::node::NodeBehavior, &mut SignalCtx<'_>) -> Poll,
    ) -> Option<Poll> {
        let mut fired = Vec::new();
        let poll = {
            let graph = &self.graph;
            let mut ctx = SignalCtx {
                graph,
                node,
                queue: &mut self.queue,
                externals: &mut self.externals,
                fired: &mut fired,
            };
            graph.with_behavior(node, |b| f(b, &mut ctx))
        };
        self.process_fired(fired);
        poll
    }

    fn process_fired(&mut self, fired: Vec<String>) {
        for name in fired {
            for activation in &mut self.activations {
                if matches!(&activation.waiting, Some(WaitReason::Event(e)) if *e == name) {
                    activation.waiting = None;
                }
            }
            for target in self.graph.internal_event_targets(&name) {
                self.queue.push_back(Trigger {
                    node: *target,
                    port: 0,
                });
            }
        }
    }

    fn apply_poll(&mut self, id: ActivationId, node: NodeId, poll: Option<Poll>) {
        match poll {
            Some(Poll::Done) => self.complete_activation(id, node),
            Some(Poll::Running) => {
                if let Some(a) = self.activations.iter_mut().find(|a| a.id == id) {
                    a.waiting = None;
                }
            }
            Some(Poll::Waiting(reason)) => {
                if let Some(a) = self.activations.iter_mut().find(|a| a.id == id) {
                    a.waiting = Some(reason);
                }
            }
            None => {
                log::warn!("node {} has no runnable behavior", node);
                self.complete_activation(id, node);
            }
        }
    }

    /// Deliver queued triggers until the queue is empty. New triggers raised
    /// while draining are handled in the same pass.
    fn drain(&mut self) {
        while let Some(trigger) = self.queue.pop_front() {
            self.activate(trigger);
        }
    }

    fn activate(&mut self, trigger: Trigger) {
        if !self.graph.contains(trigger.node) {
            log::warn!("trigger for missing node {}", trigger.node);
            return;
        }
        // a signal arriving at an already-active node cancels the old
        // activation and starts over
        if let Some(pos) = self
            .activations
            .iter()
            .position(|a| a.node == trigger.node)
        {
            self.cancel_activation(pos);
        }

        self.maybe_start();
        let id = ActivationId::new();
        self.activations.push(Activation {
            id,
            node: trigger.node,
            waiting: None,
        });
        self.emit(ReaderEvent::NodeActivated {
            node: trigger.node,
            port: trigger.port,
            activation_id: id,
        });
        let poll = self.run_behavior(trigger.node, |b, ctx| b.on_signal(ctx, trigger.port));
        self.apply_poll(id, trigger.node, poll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::VecEventSink;
    use crate::node::{NodeBehavior, PassThrough};
    use crate::port::Port;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Stays active until stopped; counts cancellations
    struct Hold {
        stops: Rc<Cell<u32>>,
    }

    impl NodeBehavior for Hold {
        fn on_signal(&mut self, _ctx: &mut SignalCtx<'_>, _port: usize) -> Poll {
            Poll::Running
        }

        fn on_stopped(&mut self) {
            self.stops.set(self.stops.get() + 1);
        }
    }

    /// Fires its output after a fixed number of ticks
    struct Delay(u64);

    impl NodeBehavior for Delay {
        fn on_signal(&mut self, _ctx: &mut SignalCtx<'_>, _port: usize) -> Poll {
            Poll::Waiting(WaitReason::Ticks(self.0))
        }

        fn poll(&mut self, ctx: &mut SignalCtx<'_>) -> Poll {
            ctx.call_port(0);
            Poll::Done
        }
    }

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn signal_node(graph: &mut Graph, behavior: Box<dyn NodeBehavior>) -> NodeId {
        graph.add_node(
            "test",
            vec![Port::signal("in")],
            vec![Port::signal("out")],
            behavior,
        )
    }

    fn chain_graph() -> (Graph, NodeId) {
        let mut graph = Graph::new("g", "Chain");
        let start = signal_node(&mut graph, Box::new(PassThrough));
        let relay = signal_node(&mut graph, Box::new(PassThrough));
        let end = signal_node(&mut graph, Box::new(PassThrough));
        graph.connect(start, 0, relay, 0).unwrap();
        graph.connect(relay, 0, end, 0).unwrap();
        (graph, start)
    }

    #[test]
    fn test_chain_runs_to_completion_in_one_call() {
        init_logs();
        let sink = Arc::new(VecEventSink::new());
        let (graph, start) = chain_graph();
        let mut reader = GraphReader::with_sink(graph, sink.clone());

        reader.start_node(start).unwrap();
        assert_eq!(reader.active_count(), 0);
        reader.tick();
        assert!(!reader.is_playing());

        let events = sink.events();
        assert!(matches!(events.first(), Some(ReaderEvent::GraphStarted { .. })));
        assert!(matches!(events.last(), Some(ReaderEvent::GraphStopped { .. })));
        let activated = events
            .iter()
            .filter(|e| matches!(e, ReaderEvent::NodeActivated { .. }))
            .count();
        let completed = events
            .iter()
            .filter(|e| matches!(e, ReaderEvent::NodeCompleted { .. }))
            .count();
        assert_eq!(activated, 3);
        assert_eq!(completed, 3);
        let started = events
            .iter()
            .filter(|e| matches!(e, ReaderEvent::GraphStarted { .. }))
            .count();
        assert_eq!(started, 1);
    }

    #[test]
    fn test_many_roots_share_one_playing_cycle() {
        let sink = Arc::new(VecEventSink::new());
        let mut graph = Graph::new("g", "Roots");
        let roots: Vec<NodeId> = (0..3)
            .map(|_| signal_node(&mut graph, Box::new(PassThrough)))
            .collect();
        let mut reader = GraphReader::with_sink(graph, sink.clone());

        for root in &roots {
            reader.start_node(*root).unwrap();
        }
        assert!(reader.is_playing());
        reader.tick();
        assert!(!reader.is_playing());

        let started = sink
            .events()
            .iter()
            .filter(|e| matches!(e, ReaderEvent::GraphStarted { .. }))
            .count();
        let stopped = sink
            .events()
            .iter()
            .filter(|e| matches!(e, ReaderEvent::GraphStopped { .. }))
            .count();
        assert_eq!((started, stopped), (1, 1));
    }

    #[test]
    fn test_stop_node_is_idempotent() {
        let stops = Rc::new(Cell::new(0));
        let mut graph = Graph::new("g", "Hold");
        let node = signal_node(&mut graph, Box::new(Hold { stops: stops.clone() }));
        let mut reader = GraphReader::new(graph);

        reader.start_node(node).unwrap();
        assert!(reader.is_playing());

        reader.stop_node(node);
        reader.stop_node(node);
        assert_eq!(stops.get(), 1);
        assert!(!reader.is_playing());

        // stopping a node that never started is also a no-op
        reader.stop_node(node);
        assert_eq!(stops.get(), 1);
    }

    #[test]
    fn test_retrigger_cancels_and_restarts() {
        let stops = Rc::new(Cell::new(0));
        let sink = Arc::new(VecEventSink::new());
        let mut graph = Graph::new("g", "Hold");
        let node = signal_node(&mut graph, Box::new(Hold { stops: stops.clone() }));
        let mut reader = GraphReader::with_sink(graph, sink.clone());

        reader.start_node(node).unwrap();
        reader.start_node(node).unwrap();
        assert_eq!(reader.active_count(), 1);
        assert_eq!(stops.get(), 1);

        let stopped = sink
            .events()
            .iter()
            .filter(|e| matches!(e, ReaderEvent::NodeStopped { .. }))
            .count();
        assert_eq!(stopped, 1);
        // the graph never went idle between the two starts
        let started = sink
            .events()
            .iter()
            .filter(|e| matches!(e, ReaderEvent::GraphStarted { .. }))
            .count();
        assert_eq!(started, 1);
    }

    #[test]
    fn test_tick_wait_elapses() {
        let mut graph = Graph::new("g", "Delay");
        let delay = signal_node(&mut graph, Box::new(Delay(2)));
        let end = signal_node(&mut graph, Box::new(PassThrough));
        graph.connect(delay, 0, end, 0).unwrap();
        let sink = Arc::new(VecEventSink::new());
        let mut reader = GraphReader::with_sink(graph, sink.clone());

        reader.start_node(delay).unwrap();
        assert!(reader.is_playing());
        assert_eq!(reader.active_count(), 1);

        reader.tick();
        assert!(reader.is_playing()); // one tick left

        reader.tick();
        assert!(!reader.is_playing());
        let completed: Vec<NodeId> = sink
            .events()
            .iter()
            .filter_map(|e| match e {
                ReaderEvent::NodeCompleted { node, .. } => Some(*node),
                _ => None,
            })
            .collect();
        assert_eq!(completed, vec![delay, end]);
    }

    #[test]
    fn test_stop_graph_cancels_everything() {
        let stops = Rc::new(Cell::new(0));
        let sink = Arc::new(VecEventSink::new());
        let mut graph = Graph::new("g", "TwoRoots");
        let a = signal_node(&mut graph, Box::new(Hold { stops: stops.clone() }));
        let b = signal_node(&mut graph, Box::new(Hold { stops: stops.clone() }));
        let mut reader = GraphReader::with_sink(graph, sink.clone());

        reader.start_node(a).unwrap();
        reader.start_node(b).unwrap();
        assert_eq!(reader.active_count(), 2);

        reader.stop_graph();
        assert!(!reader.is_playing());
        assert_eq!(reader.active_count(), 0);
        assert_eq!(stops.get(), 2);
        let stopped = sink
            .events()
            .iter()
            .filter(|e| matches!(e, ReaderEvent::NodeStopped { .. }))
            .count();
        assert_eq!(stopped, 2);
        assert!(matches!(
            sink.events().last(),
            Some(ReaderEvent::GraphStopped { .. })
        ));
    }

    #[test]
    fn test_internal_event_activates_listeners() {
        let mut graph = Graph::new("g", "Events");
        graph.declare_event("ping", EventKind::Internal).unwrap();
        let listener = signal_node(&mut graph, Box::new(PassThrough));
        graph.bind_internal_event("ping", listener).unwrap();
        let sink = Arc::new(VecEventSink::new());
        let mut reader = GraphReader::with_sink(graph, sink.clone());

        reader.trigger_internal_event("ping");
        let activated: Vec<NodeId> = sink
            .events()
            .iter()
            .filter_map(|e| match e {
                ReaderEvent::NodeActivated { node, .. } => Some(*node),
                _ => None,
            })
            .collect();
        assert_eq!(activated, vec![listener]);
        reader.tick();
        assert!(!reader.is_playing());
    }

    #[test]
    fn test_event_wait_wakes_on_internal_event() {
        struct WaitForPing;
        impl NodeBehavior for WaitForPing {
            fn on_signal(&mut self, _ctx: &mut SignalCtx<'_>, _port: usize) -> Poll {
                Poll::Waiting(WaitReason::Event("ping".to_string()))
            }
            fn poll(&mut self, _ctx: &mut SignalCtx<'_>) -> Poll {
                Poll::Done
            }
        }

        let mut graph = Graph::new("g", "EventWait");
        graph.declare_event("ping", EventKind::Internal).unwrap();
        let waiter = signal_node(&mut graph, Box::new(WaitForPing));
        let mut reader = GraphReader::new(graph);

        reader.start_node(waiter).unwrap();
        reader.tick();
        reader.tick();
        assert!(reader.is_playing()); // ticks alone never wake an event wait

        reader.trigger_internal_event("ping");
        reader.tick();
        assert!(!reader.is_playing());
    }

    #[test]
    fn test_external_event_reaches_host_callback() {
        struct Announce;
        impl NodeBehavior for Announce {
            fn on_signal(&mut self, ctx: &mut SignalCtx<'_>, _port: usize) -> Poll {
                ctx.call_external_event("score", &Value::Float(12.5));
                Poll::Done
            }
        }

        let mut graph = Graph::new("g", "External");
        graph.declare_event("score", EventKind::External).unwrap();
        let node = signal_node(&mut graph, Box::new(Announce));
        let mut reader = GraphReader::new(graph);

        let seen = Rc::new(Cell::new(0.0_f64));
        let seen_in_cb = seen.clone();
        reader.on_external_float("score", move |v| seen_in_cb.set(v));

        reader.start_node(node).unwrap();
        assert_eq!(seen.get(), 12.5);
    }
}
