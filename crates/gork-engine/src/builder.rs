//! Fluent builder for constructing graphs programmatically
//!
//! Nodes are referred to by short string aliases during construction so a
//! whole graph can be described in one chained expression. Errors are
//! deferred: the first failure is remembered and returned from [`build`],
//! letting every call in the chain stay infallible.
//!
//! [`build`]: GraphBuilder::build

use std::collections::HashMap;

use crate::convert::ConverterRegistry;
use crate::error::{EngineError, Result};
use crate::graph::{EventKind, Graph};
use crate::node::NodeId;
use crate::registry::KindRegistry;
use crate::value::{TypeTag, Value};

/// Fluent builder over a kind registry
///
/// # Example
///
/// ```ignore
/// let graph = GraphBuilder::new(&registry, "g1", "Door logic")
///     .node("start", "flow/start")
///     .node("open", "flow/relay")
///     .connect("start", 0, "open", 0)
///     .tag("start", "root")
///     .parameter("speed", TypeTag::Float, Value::Float(1.0))
///     .build()?;
/// ```
pub struct GraphBuilder<'r> {
    registry: &'r KindRegistry,
    graph: Graph,
    aliases: HashMap<String, NodeId>,
    last: Option<NodeId>,
    error: Option<EngineError>,
}

impl<'r> GraphBuilder<'r> {
    /// Start building a graph. The standard numeric and boolean converters
    /// come pre-registered; use [`converters`] to replace them.
    ///
    /// [`converters`]: GraphBuilder::converters
    pub fn new(registry: &'r KindRegistry, id: impl Into<String>, name: impl Into<String>) -> Self {
        let mut graph = Graph::new(id, name);
        graph.set_converters(ConverterRegistry::with_standard_conversions());
        Self {
            registry,
            graph,
            aliases: HashMap::new(),
            last: None,
            error: None,
        }
    }

    /// Replace the converter registry
    pub fn converters(mut self, converters: ConverterRegistry) -> Self {
        self.graph.set_converters(converters);
        self
    }

    /// Add a node of a registered kind under an alias
    pub fn node(mut self, alias: impl Into<String>, kind: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        let alias = alias.into();
        match self.graph.spawn(self.registry, kind) {
            Ok(id) => {
                if self.aliases.insert(alias.clone(), id).is_some() {
                    log::warn!("alias '{}' reused; it now names the newer node", alias);
                }
                self.last = Some(id);
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Load instance data into the most recently added node's behavior.
    ///
    /// Must follow the `node` call it configures.
    pub fn with_data(self, data: serde_json::Value) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.last {
            Some(id) => {
                self.graph.with_behavior(id, |b| b.load_data(&data));
            }
            None => log::warn!("with_data called before any node was added"),
        }
        self
    }

    /// Connect two nodes by alias
    pub fn connect(mut self, src: &str, src_port: usize, dst: &str, dst_port: usize) -> Self {
        if self.error.is_some() {
            return self;
        }
        match (self.resolve(src), self.resolve(dst)) {
            (Ok(src_id), Ok(dst_id)) => {
                if let Err(e) = self.graph.connect(src_id, src_port, dst_id, dst_port) {
                    self.error = Some(e);
                }
            }
            (Err(e), _) | (_, Err(e)) => self.error = Some(e),
        }
        self
    }

    /// Tag a node by alias
    pub fn tag(mut self, alias: &str, tag: impl Into<String>) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.resolve(alias) {
            Ok(id) => {
                self.graph.add_tag(id, tag);
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Declare a graph parameter
    pub fn parameter(mut self, name: impl Into<String>, ty: TypeTag, start: Value) -> Self {
        if self.error.is_some() {
            return self;
        }
        if let Err(e) = self.graph.declare_parameter(name, ty, start) {
            self.error = Some(e);
        }
        self
    }

    /// Declare an event name
    pub fn event(mut self, name: impl Into<String>, kind: EventKind) -> Self {
        if self.error.is_some() {
            return self;
        }
        if let Err(e) = self.graph.declare_event(name, kind) {
            self.error = Some(e);
        }
        self
    }

    /// Bind a node by alias as a listener of an internal event
    pub fn bind(mut self, event: impl Into<String>, alias: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.resolve(alias) {
            Ok(id) => {
                if let Err(e) = self.graph.bind_internal_event(event, id) {
                    self.error = Some(e);
                }
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Node identity behind an alias, for wiring done outside the builder
    pub fn id_of(&self, alias: &str) -> Option<NodeId> {
        self.aliases.get(alias).copied()
    }

    /// Finish, returning the graph or the first deferred error
    pub fn build(self) -> Result<Graph> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.graph),
        }
    }

    fn resolve(&self, alias: &str) -> Result<NodeId> {
        self.aliases
            .get(alias)
            .copied()
            .ok_or_else(|| EngineError::UnknownAlias(alias.to_string()))
    }
}
