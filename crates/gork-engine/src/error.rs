//! Error types for the execution engine
//!
//! Runtime value pulls and signal pushes never return errors — authoring
//! mistakes there are logged and degrade to zero values. `EngineError` covers
//! the authoring and registration operations that can legitimately fail.

use thiserror::Error;

use crate::node::NodeId;
use crate::value::TypeTag;

/// Result type alias using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while authoring or loading a graph
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced node does not exist in the graph
    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    /// A port index is beyond the node's declared port count
    #[error("port index {port} out of range for node {node} ({count} ports)")]
    PortOutOfRange {
        node: NodeId,
        port: usize,
        count: usize,
    },

    /// A converter is already registered for this ordered type pair
    #[error("converter {from} -> {to} is already registered")]
    DuplicateConverter { from: TypeTag, to: TypeTag },

    /// A declared value does not match the declared type
    #[error("type mismatch for '{name}': declared {declared}, got {got}")]
    TypeMismatch {
        name: String,
        declared: TypeTag,
        got: TypeTag,
    },

    /// An event name is already declared with a different kind
    #[error("event '{0}' is already declared with a different kind")]
    EventConflict(String),

    /// The node kind is not present in the registry
    #[error("unknown node kind '{0}'")]
    UnknownKind(String),

    /// A builder alias does not name any added node
    #[error("unknown node alias '{0}'")]
    UnknownAlias(String),

    /// The kind is registered with metadata only, no behavior factory
    #[error("node kind '{0}' has no behavior factory")]
    NoFactory(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
