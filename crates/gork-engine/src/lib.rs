//! Gork Engine - node graph execution for Gork scripts
//!
//! This crate is the runtime for Gork's node graphs. It supports:
//!
//! - Typed ports with pull-based value propagation and pluggable conversion
//! - Signal propagation through a cooperative, single-threaded reader
//! - Activation lifecycle with tick/event suspension and cancellation
//! - Graph-scoped parameters, tags, and internal/external events
//! - JSON persistence that preserves node identity
//!
//! # Architecture
//!
//! A [`Graph`] owns the nodes, their connections, and shared state; a
//! [`GraphReader`] owns a graph and runs it. Node kinds register behaviors
//! through a [`KindRegistry`], and hosts observe execution through an
//! [`EventSink`].
//!
//! # Example
//!
//! ```ignore
//! use gork_engine::{GraphBuilder, GraphReader, KindRegistry};
//!
//! let mut registry = KindRegistry::new();
//! gork_nodes::register_builtins(&mut registry);
//!
//! let graph = GraphBuilder::new(&registry, "g1", "My Script")
//!     .node("start", "flow/start")
//!     .node("log", "debug/log")
//!     .connect("start", 0, "log", 0)
//!     .build()?;
//!
//! let mut reader = GraphReader::new(graph);
//! reader.start_node(reader.graph().nodes()[0].id)?;
//! ```

pub mod builder;
pub mod connection;
pub mod convert;
pub mod error;
pub mod events;
pub mod graph;
pub mod node;
pub mod params;
pub mod persist;
pub mod port;
pub mod reader;
pub mod registry;
pub mod validate;
pub mod value;

// Re-export key types
pub use builder::GraphBuilder;
pub use connection::{Connection, ConnectionTable};
pub use convert::ConverterRegistry;
pub use error::{EngineError, Result};
pub use events::{EventSink, NullEventSink, ReaderEvent, VecEventSink};
pub use graph::{EventKind, Graph, ValueCtx};
pub use node::{Node, NodeBehavior, NodeId, PassThrough, Poll, WaitReason};
pub use params::ParameterStore;
pub use persist::{load_graph, save_graph, GraphDocument};
pub use port::{Port, PortCollection};
pub use reader::{ActivationId, GraphReader, SignalCtx, Trigger};
pub use registry::{BehaviorFactory, KindRegistry, NodeKindMetadata, PortSpec};
pub use validate::{validate_graph, ValidationIssue};
pub use value::{TypeTag, Value};
