//! The graph: node ownership, connections, parameters, tags, and events
//!
//! The graph owns the node set and every piece of shared state node behaviors
//! touch at runtime. Behaviors and parameters sit behind interior mutability
//! so a running behavior can pull values from upstream producers through a
//! shared graph reference; execution is single-threaded and cooperative, so
//! a failed re-entrant borrow can only mean a pull cycle, which is handled as
//! a soft error.

use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::connection::Connection;
use crate::convert::ConverterRegistry;
use crate::error::{EngineError, Result};
use crate::node::{Node, NodeBehavior, NodeId};
use crate::params::ParameterStore;
use crate::port::{Port, PortCollection};
use crate::registry::KindRegistry;
use crate::value::{TypeTag, Value};

/// Whether an event name belongs to the host boundary or the graph itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Raised by node behaviors, consumed by host callbacks
    External,
    /// Raised by name, activates bound listener nodes
    Internal,
}

/// A node graph: nodes, connections, parameters, tags, events
pub struct Graph {
    id: String,
    name: String,
    nodes: Vec<Node>,
    behaviors: HashMap<NodeId, RefCell<Box<dyn NodeBehavior>>>,
    converters: ConverterRegistry,
    params: RefCell<ParameterStore>,
    events: BTreeMap<String, EventKind>,
    tag_index: HashMap<String, Vec<NodeId>>,
    listeners: HashMap<String, Vec<NodeId>>,
}

impl Graph {
    /// Create an empty graph with no converters registered
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nodes: Vec::new(),
            behaviors: HashMap::new(),
            converters: ConverterRegistry::new(),
            params: RefCell::new(ParameterStore::new()),
            events: BTreeMap::new(),
            tag_index: HashMap::new(),
            listeners: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // -----------------------------------------------------------------------
    // Nodes
    // -----------------------------------------------------------------------

    /// Create a node of a registered kind, with a fresh identity
    pub fn spawn(&mut self, registry: &KindRegistry, kind: &str) -> Result<NodeId> {
        self.spawn_with_id(registry, kind, NodeId::new())
    }

    /// Create a node of a registered kind with a given identity.
    ///
    /// Used by persistence to preserve node identity across a round-trip.
    pub fn spawn_with_id(
        &mut self,
        registry: &KindRegistry,
        kind: &str,
        id: NodeId,
    ) -> Result<NodeId> {
        let metadata = registry
            .metadata(kind)
            .ok_or_else(|| EngineError::UnknownKind(kind.to_string()))?;
        let behavior = registry.instantiate(kind)?;
        let inputs = PortCollection::from_declared(
            metadata
                .inputs
                .iter()
                .map(|spec| Port::new(spec.name.clone(), spec.ty))
                .collect(),
        );
        let outputs = PortCollection::from_declared(
            metadata
                .outputs
                .iter()
                .map(|spec| Port::new(spec.name.clone(), spec.ty))
                .collect(),
        );
        self.insert_node(Node::new(id, kind, inputs, outputs), behavior);
        Ok(id)
    }

    /// Add a node with explicit ports and behavior, bypassing the registry
    pub fn add_node(
        &mut self,
        kind: impl Into<String>,
        inputs: Vec<Port>,
        outputs: Vec<Port>,
        behavior: Box<dyn NodeBehavior>,
    ) -> NodeId {
        let id = NodeId::new();
        self.insert_node(
            Node::new(
                id,
                kind,
                PortCollection::from_declared(inputs),
                PortCollection::from_declared(outputs),
            ),
            behavior,
        );
        id
    }

    fn insert_node(&mut self, node: Node, behavior: Box<dyn NodeBehavior>) {
        self.behaviors.insert(node.id, RefCell::new(behavior));
        self.nodes.push(node);
    }

    /// Delete a node, severing every connection that references it.
    ///
    /// Returns whether the node existed.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(pos) = self.nodes.iter().position(|n| n.id == id) else {
            return false;
        };
        let node = self.nodes.remove(pos);
        for other in &mut self.nodes {
            other.inbound.purge_node(id);
            other.outbound.purge_node(id);
        }
        self.behaviors.remove(&id);
        for tag in &node.tags {
            if let Some(ids) = self.tag_index.get_mut(tag) {
                ids.retain(|n| *n != id);
            }
        }
        for ids in self.listeners.values_mut() {
            ids.retain(|n| *n != id);
        }
        true
    }

    /// Look up a node by identity
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Look up a node by identity (mutable)
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// All nodes, in creation order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Whether a node with this identity exists
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Run a closure against a node's behavior.
    ///
    /// Hosts use this to configure or inspect instance data. Returns `None`
    /// if the node has no behavior or the behavior is already executing
    /// (re-entrant borrow).
    pub fn with_behavior<R>(
        &self,
        id: NodeId,
        f: impl FnOnce(&mut dyn NodeBehavior) -> R,
    ) -> Option<R> {
        let cell = self.behaviors.get(&id)?;
        let mut behavior = cell.try_borrow_mut().ok()?;
        Some(f(behavior.as_mut()))
    }

    // -----------------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------------

    /// Connect `src`'s output port to `dst`'s input port.
    ///
    /// Both halves of the edge are written under this single call; the
    /// tables are never left one-sided.
    pub fn connect(
        &mut self,
        src: NodeId,
        src_port: usize,
        dst: NodeId,
        dst_port: usize,
    ) -> Result<()> {
        let src_outputs = self
            .node(src)
            .ok_or(EngineError::NodeNotFound(src))?
            .outputs
            .len();
        let dst_inputs = self
            .node(dst)
            .ok_or(EngineError::NodeNotFound(dst))?
            .inputs
            .len();
        if src_port >= src_outputs {
            return Err(EngineError::PortOutOfRange {
                node: src,
                port: src_port,
                count: src_outputs,
            });
        }
        if dst_port >= dst_inputs {
            return Err(EngineError::PortOutOfRange {
                node: dst,
                port: dst_port,
                count: dst_inputs,
            });
        }
        // checks done; both inserts below cannot fail
        if let Some(node) = self.node_mut(src) {
            node.outbound.add(src_port, Connection::new(dst, dst_port));
        }
        if let Some(node) = self.node_mut(dst) {
            node.inbound.add(dst_port, Connection::new(src, src_port));
        }
        Ok(())
    }

    /// Remove the edge between `src`'s output port and `dst`'s input port.
    ///
    /// A missing edge (or missing node) is a silent no-op; both halves are
    /// removed together when present.
    pub fn disconnect(&mut self, src: NodeId, src_port: usize, dst: NodeId, dst_port: usize) {
        if let Some(node) = self.node_mut(src) {
            node.outbound.remove(src_port, Connection::new(dst, dst_port));
        }
        if let Some(node) = self.node_mut(dst) {
            node.inbound.remove(dst_port, Connection::new(src, src_port));
        }
    }

    // -----------------------------------------------------------------------
    // Tags
    // -----------------------------------------------------------------------

    /// Tag a node. Returns whether the tag was newly added.
    pub fn add_tag(&mut self, id: NodeId, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        let Some(node) = self.node_mut(id) else {
            log::warn!("cannot tag missing node {}", id);
            return false;
        };
        if !node.tags.insert(tag.clone()) {
            return false;
        }
        self.tag_index.entry(tag).or_default().push(id);
        true
    }

    /// Remove a tag from a node
    pub fn remove_tag(&mut self, id: NodeId, tag: &str) {
        if let Some(node) = self.node_mut(id) {
            if node.tags.remove(tag) {
                if let Some(ids) = self.tag_index.get_mut(tag) {
                    ids.retain(|n| *n != id);
                }
            }
        }
    }

    /// Nodes bearing a tag, in tagging order
    pub fn nodes_with_tag(&self, tag: &str) -> &[NodeId] {
        self.tag_index.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Declare an event name. Redeclaring with the same kind is a no-op;
    /// redeclaring with a different kind is a conflict.
    pub fn declare_event(&mut self, name: impl Into<String>, kind: EventKind) -> Result<()> {
        let name = name.into();
        match self.events.get(&name) {
            Some(existing) if *existing != kind => Err(EngineError::EventConflict(name)),
            Some(_) => Ok(()),
            None => {
                self.events.insert(name, kind);
                Ok(())
            }
        }
    }

    /// Kind of a declared event
    pub fn event_kind(&self, name: &str) -> Option<EventKind> {
        self.events.get(name).copied()
    }

    /// Iterate declared events in name order
    pub fn events(&self) -> impl Iterator<Item = (&str, EventKind)> {
        self.events.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    /// Bind a node to be activated when an internal event fires
    pub fn bind_internal_event(&mut self, name: impl Into<String>, id: NodeId) -> Result<()> {
        if !self.contains(id) {
            return Err(EngineError::NodeNotFound(id));
        }
        let targets = self.listeners.entry(name.into()).or_default();
        if !targets.contains(&id) {
            targets.push(id);
        }
        Ok(())
    }

    /// Remove a node's internal event binding
    pub fn unbind_internal_event(&mut self, name: &str, id: NodeId) {
        if let Some(targets) = self.listeners.get_mut(name) {
            targets.retain(|n| *n != id);
        }
    }

    /// Nodes bound to an internal event, in binding order
    pub fn internal_event_targets(&self, name: &str) -> &[NodeId] {
        self.listeners.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate `(event, node)` listener bindings for persistence
    pub(crate) fn listener_bindings(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.listeners
            .iter()
            .flat_map(|(name, ids)| ids.iter().map(move |id| (name.as_str(), *id)))
    }

    // -----------------------------------------------------------------------
    // Parameters
    // -----------------------------------------------------------------------

    /// Declare a parameter with its start value
    pub fn declare_parameter(
        &mut self,
        name: impl Into<String>,
        ty: TypeTag,
        start: Value,
    ) -> Result<()> {
        self.params.borrow_mut().declare(name, ty, start)
    }

    /// Current value of a parameter
    pub fn param(&self, name: &str, ty: TypeTag) -> Option<Value> {
        self.params.borrow().get(name, ty).cloned()
    }

    /// Write a declared parameter's current value (soft on mismatch)
    pub fn set_param(&self, name: &str, ty: TypeTag, value: Value) -> bool {
        self.params.borrow_mut().set(name, ty, value)
    }

    /// Restore every parameter to its declared start value
    pub fn reset_parameters(&self) {
        self.params.borrow_mut().reset_to_start();
    }

    /// Read access to the parameter store
    pub fn params(&self) -> Ref<'_, ParameterStore> {
        self.params.borrow()
    }

    pub(crate) fn restore_param(&self, name: &str, ty: TypeTag, current: Value) {
        self.params.borrow_mut().restore_current(name, ty, current);
    }

    // -----------------------------------------------------------------------
    // Converters
    // -----------------------------------------------------------------------

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    pub fn converters_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.converters
    }

    /// Replace the converter registry wholesale
    pub fn set_converters(&mut self, converters: ConverterRegistry) {
        self.converters = converters;
    }

    // -----------------------------------------------------------------------
    // Value pull protocol
    // -----------------------------------------------------------------------

    /// Resolve the value flowing into an input port.
    ///
    /// Soft failures (signal-typed port, unconnected input, missing
    /// converter, pull cycle) are logged and yield a zero value; this call
    /// never panics for authoring mistakes.
    pub fn pull_input(&self, node: NodeId, port: usize) -> Value {
        let Some(owner) = self.node(node) else {
            log::warn!("value pull from missing node {}", node);
            return Value::zero(TypeTag::Object);
        };
        let Some(input) = owner.inputs.get(port) else {
            // a behavior asking for a port it does not declare is a
            // programming error in the behavior itself
            debug_assert!(false, "input port {} out of range on node {}", port, node);
            log::warn!("input port {} out of range on node {}", port, node);
            return Value::zero(TypeTag::Object);
        };
        let tin = input.ty;
        if tin.is_signal() {
            log::warn!(
                "ports of signal type carry no value (node {}, input '{}')",
                node,
                input.name
            );
            return Value::zero(tin);
        }

        // first connection whose peer still exists; dangling references left
        // behind by interleaved edits are filtered out
        let conn = owner
            .inbound
            .get(port)
            .iter()
            .copied()
            .find(|c| self.contains(c.node));
        let Some(conn) = conn else {
            log::warn!("unconnected input '{}' on node {}", input.name, node);
            return Value::zero(tin);
        };

        let Some(peer) = self.node(conn.node) else {
            return Value::zero(tin);
        };
        let Some(output) = peer.outputs.get(conn.port) else {
            log::warn!(
                "connection into '{}' on node {} references missing output port {}",
                input.name,
                node,
                conn.port
            );
            return Value::zero(tin);
        };
        let tout = output.ty;
        if tout.is_signal() {
            log::warn!(
                "ports of signal type carry no value (node {}, output '{}')",
                conn.node,
                output.name
            );
            return Value::zero(tin);
        }

        if tin == tout {
            return self.produce(conn.node, conn.port, tout);
        }
        if tin == TypeTag::Object {
            // untyped pass-through of the producer's native value
            return self.produce(conn.node, conn.port, tout);
        }
        if tin == TypeTag::Str {
            // the string fallback can never fail
            return self.produce(conn.node, conn.port, tout).stringify();
        }
        match self.converters.get(tout, tin) {
            Some(convert) => convert(&self.produce(conn.node, conn.port, tout)),
            None => {
                log::warn!(
                    "no converter registered for {} -> {} (node {}, input '{}')",
                    tout,
                    tin,
                    node,
                    input.name
                );
                Value::zero(tin)
            }
        }
    }

    /// Invoke a node's value production for an output port
    fn produce(&self, node: NodeId, port: usize, requested: TypeTag) -> Value {
        let ctx = ValueCtx::new(self, node);
        match self.with_behavior(node, |b| b.produce_value(&ctx, port, requested)) {
            Some(value) => value,
            None => {
                log::warn!(
                    "value pull cycle or missing behavior at node {}, port {}",
                    node,
                    port
                );
                Value::zero(requested)
            }
        }
    }
}

/// Context handed to a behavior while it produces a value
pub struct ValueCtx<'a> {
    graph: &'a Graph,
    node: NodeId,
}

impl<'a> ValueCtx<'a> {
    pub(crate) fn new(graph: &'a Graph, node: NodeId) -> Self {
        Self { graph, node }
    }

    /// Identity of the node being asked to produce
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
}
