//! Graph-scoped parameters
//!
//! Parameters are named, typed, shared mutable state. Identity is the
//! `(name, type)` pair — two parameters may share a name only if their types
//! differ. Start values and current values are stored as two explicit maps so
//! the runtime state can be reset to its authored starting point.

use std::collections::HashMap;

use crate::error::{EngineError, Result};
use crate::value::{TypeTag, Value};

/// Store of declared parameters with start and current values
#[derive(Default)]
pub struct ParameterStore {
    start: HashMap<(String, TypeTag), Value>,
    current: HashMap<(String, TypeTag), Value>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a parameter with its start value.
    ///
    /// Redeclaring the same `(name, type)` identity is a soft error: logged
    /// and ignored, the original declaration stands. A start value of the
    /// wrong type is rejected up front.
    pub fn declare(&mut self, name: impl Into<String>, ty: TypeTag, start: Value) -> Result<()> {
        let name = name.into();
        if start.type_tag() != ty {
            return Err(EngineError::TypeMismatch {
                name,
                declared: ty,
                got: start.type_tag(),
            });
        }
        let key = (name, ty);
        if self.start.contains_key(&key) {
            log::warn!("parameter '{}' ({}) already declared; keeping it", key.0, ty);
            return Ok(());
        }
        self.current.insert(key.clone(), start.clone());
        self.start.insert(key, start);
        Ok(())
    }

    /// Current value of a parameter
    pub fn get(&self, name: &str, ty: TypeTag) -> Option<&Value> {
        self.current.get(&(name.to_string(), ty))
    }

    /// Declared start value of a parameter
    pub fn start_value(&self, name: &str, ty: TypeTag) -> Option<&Value> {
        self.start.get(&(name.to_string(), ty))
    }

    /// Write the current value of a declared parameter.
    ///
    /// Writes to undeclared parameters or with a mismatched value type are
    /// soft errors: logged and ignored. Returns whether the write took.
    pub fn set(&mut self, name: &str, ty: TypeTag, value: Value) -> bool {
        if value.type_tag() != ty {
            log::warn!(
                "ignoring write to parameter '{}': declared {}, got {}",
                name,
                ty,
                value.type_tag()
            );
            return false;
        }
        match self.current.get_mut(&(name.to_string(), ty)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => {
                log::warn!("ignoring write to undeclared parameter '{}' ({})", name, ty);
                false
            }
        }
    }

    /// Restore every parameter to its declared start value
    pub fn reset_to_start(&mut self) {
        for (key, start) in &self.start {
            self.current.insert(key.clone(), start.clone());
        }
    }

    /// Iterate `(name, type, start, current)` for persistence
    pub fn iter(&self) -> impl Iterator<Item = (&str, TypeTag, &Value, &Value)> {
        self.start.iter().map(|(key, start)| {
            let current = self.current.get(key).unwrap_or(start);
            (key.0.as_str(), key.1, start, current)
        })
    }

    /// Number of declared parameters
    pub fn len(&self) -> usize {
        self.start.len()
    }

    /// Whether no parameters are declared
    pub fn is_empty(&self) -> bool {
        self.start.is_empty()
    }

    /// Force the current value during load, bypassing declaration checks
    /// other than type identity. Used by persistence only.
    pub(crate) fn restore_current(&mut self, name: &str, ty: TypeTag, value: Value) {
        if self.start.contains_key(&(name.to_string(), ty)) {
            self.current.insert((name.to_string(), ty), value);
        }
    }
}
