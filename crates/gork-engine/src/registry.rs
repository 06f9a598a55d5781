//! Node kind registry
//!
//! Maps kind identifiers to static metadata (label, category path, color,
//! declared ports) and behavior factories. Hosts populate the registry with
//! explicit calls at initialization — there is no reflection scan and no
//! global registry instance.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::node::NodeBehavior;
use crate::value::TypeTag;

/// Declared name + type of one port in kind metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub name: String,
    pub ty: TypeTag,
}

impl PortSpec {
    pub fn new(name: impl Into<String>, ty: TypeTag) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// A control-flow-only port
    pub fn signal(name: impl Into<String>) -> Self {
        Self::new(name, TypeTag::Signal)
    }
}

/// Static metadata describing a node kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeKindMetadata {
    /// Unique kind identifier (e.g. "flow/branch")
    pub kind: String,
    /// Human-readable label
    pub label: String,
    /// Category path for palette grouping (e.g. "Flow")
    pub category: String,
    /// Display color hint, as a hex string
    pub color: Option<String>,
    /// Declared input ports (the fixed prefix of every instance)
    pub inputs: Vec<PortSpec>,
    /// Declared output ports
    pub outputs: Vec<PortSpec>,
}

impl NodeKindMetadata {
    /// Metadata with no ports; add them with the `with_*` methods
    pub fn new(
        kind: impl Into<String>,
        label: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            label: label.into(),
            category: category.into(),
            color: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<PortSpec>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<PortSpec>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Factory for creating a fresh behavior instance per node
pub trait BehaviorFactory {
    fn create(&self) -> Box<dyn NodeBehavior>;
}

struct FnFactory<F>(F);

impl<F> BehaviorFactory for FnFactory<F>
where
    F: Fn() -> Box<dyn NodeBehavior>,
{
    fn create(&self) -> Box<dyn NodeBehavior> {
        (self.0)()
    }
}

struct KindEntry {
    metadata: NodeKindMetadata,
    factory: Option<Arc<dyn BehaviorFactory>>,
}

/// Registry of node kinds with metadata and behavior factories
#[derive(Default)]
pub struct KindRegistry {
    entries: HashMap<String, KindEntry>,
}

impl KindRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind with metadata and a behavior factory
    pub fn register(&mut self, metadata: NodeKindMetadata, factory: Arc<dyn BehaviorFactory>) {
        self.entries.insert(
            metadata.kind.clone(),
            KindEntry {
                metadata,
                factory: Some(factory),
            },
        );
    }

    /// Register a kind using a plain constructor closure
    pub fn register_fn(
        &mut self,
        metadata: NodeKindMetadata,
        f: impl Fn() -> Box<dyn NodeBehavior> + 'static,
    ) {
        self.register(metadata, Arc::new(FnFactory(f)));
    }

    /// Register metadata only (e.g. for palette listing of host-provided kinds)
    pub fn register_metadata(&mut self, metadata: NodeKindMetadata) {
        self.entries.insert(
            metadata.kind.clone(),
            KindEntry {
                metadata,
                factory: None,
            },
        );
    }

    /// Metadata for a kind
    pub fn metadata(&self, kind: &str) -> Option<&NodeKindMetadata> {
        self.entries.get(kind).map(|e| &e.metadata)
    }

    /// All registered metadata
    pub fn all_metadata(&self) -> Vec<&NodeKindMetadata> {
        self.entries.values().map(|e| &e.metadata).collect()
    }

    /// Metadata grouped by category path
    pub fn metadata_by_category(&self) -> HashMap<&str, Vec<&NodeKindMetadata>> {
        let mut grouped: HashMap<&str, Vec<&NodeKindMetadata>> = HashMap::new();
        for entry in self.entries.values() {
            grouped
                .entry(entry.metadata.category.as_str())
                .or_default()
                .push(&entry.metadata);
        }
        grouped
    }

    /// Whether a kind is registered
    pub fn has_kind(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    /// All registered kind identifiers
    pub fn kinds(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Instantiate a fresh behavior for a kind
    pub fn instantiate(&self, kind: &str) -> Result<Box<dyn NodeBehavior>> {
        let entry = self
            .entries
            .get(kind)
            .ok_or_else(|| EngineError::UnknownKind(kind.to_string()))?;
        let factory = entry
            .factory
            .as_ref()
            .ok_or_else(|| EngineError::NoFactory(kind.to_string()))?;
        Ok(factory.create())
    }

    /// Merge another registry into this one.
    ///
    /// Entries from `other` override entries sharing the same kind.
    pub fn merge(&mut self, other: KindRegistry) {
        self.entries.extend(other.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::PassThrough;

    fn test_metadata(kind: &str) -> NodeKindMetadata {
        NodeKindMetadata {
            kind: kind.to_string(),
            label: format!("Test {}", kind),
            category: "Test".to_string(),
            color: None,
            inputs: vec![PortSpec::signal("in")],
            outputs: vec![PortSpec::signal("out")],
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = KindRegistry::new();
        registry.register_fn(test_metadata("test/echo"), || Box::new(PassThrough));

        assert!(registry.has_kind("test/echo"));
        assert!(!registry.has_kind("test/missing"));
        assert_eq!(registry.metadata("test/echo").unwrap().category, "Test");
        assert!(registry.instantiate("test/echo").is_ok());
    }

    #[test]
    fn test_unknown_kind() {
        let registry = KindRegistry::new();
        assert!(matches!(
            registry.instantiate("nope"),
            Err(EngineError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_metadata_only_has_no_factory() {
        let mut registry = KindRegistry::new();
        registry.register_metadata(test_metadata("host/custom"));
        assert!(registry.has_kind("host/custom"));
        assert!(matches!(
            registry.instantiate("host/custom"),
            Err(EngineError::NoFactory(_))
        ));
    }

    #[test]
    fn test_merge_overrides() {
        let mut registry1 = KindRegistry::new();
        let mut meta1 = test_metadata("a");
        meta1.label = "Original".to_string();
        registry1.register_metadata(meta1);

        let mut registry2 = KindRegistry::new();
        let mut meta2 = test_metadata("a");
        meta2.label = "Override".to_string();
        registry2.register_metadata(meta2);
        registry2.register_metadata(test_metadata("b"));

        registry1.merge(registry2);
        assert_eq!(registry1.all_metadata().len(), 2);
        assert_eq!(registry1.metadata("a").unwrap().label, "Override");
    }
}
