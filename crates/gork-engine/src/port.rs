//! Ports and port collections
//!
//! A node's ports are a flat vector addressed by a single index: a fixed
//! prefix declared by the node kind, followed by instance-specific custom
//! ports. Only the custom suffix is mutable at the instance level.

use serde::{Deserialize, Serialize};

use crate::value::TypeTag;

/// A named, typed slot on a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Human-readable name
    pub name: String,
    /// Data type; Signal-typed ports carry control flow only
    pub ty: TypeTag,
}

impl Port {
    /// Create a port with an explicit type
    pub fn new(name: impl Into<String>, ty: TypeTag) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Create a control-flow-only port
    pub fn signal(name: impl Into<String>) -> Self {
        Self::new(name, TypeTag::Signal)
    }
}

/// Ordered ports of one side of a node: kind-declared prefix + custom suffix
#[derive(Debug, Clone, Default)]
pub struct PortCollection {
    ports: Vec<Port>,
    fixed_len: usize,
}

impl PortCollection {
    /// Build a collection whose entire current content is the fixed prefix
    pub fn from_declared(declared: Vec<Port>) -> Self {
        let fixed_len = declared.len();
        Self {
            ports: declared,
            fixed_len,
        }
    }

    /// Port at flat index `i`, spanning both partitions
    pub fn get(&self, i: usize) -> Option<&Port> {
        self.ports.get(i)
    }

    /// Total port count
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Whether the collection has no ports at all
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Length of the immutable kind-declared prefix
    pub fn fixed_len(&self) -> usize {
        self.fixed_len
    }

    /// Iterate all ports in flat-index order
    pub fn iter(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter()
    }

    /// The custom suffix only
    pub fn custom(&self) -> &[Port] {
        &self.ports[self.fixed_len..]
    }

    /// Index of the first port with this name, spanning both partitions
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.ports.iter().position(|p| p.name == name)
    }

    /// Append a custom port, returning its flat index
    pub fn push_custom(&mut self, port: Port) -> usize {
        self.ports.push(port);
        self.ports.len() - 1
    }

    /// Insert a custom port at flat index `i`.
    ///
    /// Indices inside the fixed prefix are a logged no-op.
    pub fn insert_custom(&mut self, i: usize, port: Port) {
        if i < self.fixed_len {
            log::warn!(
                "refusing to insert port '{}' at index {} inside the fixed prefix (len {})",
                port.name,
                i,
                self.fixed_len
            );
            return;
        }
        let i = i.min(self.ports.len());
        self.ports.insert(i, port);
    }

    /// Remove the custom port at flat index `i`.
    ///
    /// Prefix indices and out-of-range indices are a logged no-op.
    pub fn remove_custom(&mut self, i: usize) -> Option<Port> {
        if i < self.fixed_len {
            log::warn!(
                "refusing to remove port index {} inside the fixed prefix (len {})",
                i,
                self.fixed_len
            );
            return None;
        }
        if i >= self.ports.len() {
            log::warn!("port index {} out of range ({} ports)", i, self.ports.len());
            return None;
        }
        Some(self.ports.remove(i))
    }

    /// Remove custom ports in `[start, start + count)`, clamped to the suffix
    pub fn remove_custom_range(&mut self, start: usize, count: usize) {
        let end = start.saturating_add(count).min(self.ports.len());
        let start = start.max(self.fixed_len);
        if start < end {
            self.ports.drain(start..end);
        }
    }
}
