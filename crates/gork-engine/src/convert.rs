//! Type converter registry
//!
//! Converters are pure functions keyed by an ordered (source, destination)
//! type pair, invoked by the value-pull protocol when a typed input is fed by
//! a producer of a different type. Registration is explicit — hosts call
//! [`ConverterRegistry::register`] at initialization; there is no global
//! state and no reflection scan.

use std::collections::HashMap;

use crate::error::{EngineError, Result};
use crate::value::{TypeTag, Value};

/// A pure conversion function
pub type ConvertFn = Box<dyn Fn(&Value) -> Value>;

/// Registry of (source type -> destination type) conversion functions
#[derive(Default)]
pub struct ConverterRegistry {
    table: HashMap<(TypeTag, TypeTag), ConvertFn>,
}

impl ConverterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-loaded with the standard numeric/bool converters:
    /// float<->int (round to nearest), int<->bool, float<->bool.
    pub fn with_standard_conversions() -> Self {
        let mut registry = Self::new();
        let entries: [(TypeTag, TypeTag, fn(&Value) -> Value); 6] = [
            (TypeTag::Float, TypeTag::Int, |v| Value::Int(v.as_int_lossy())),
            (TypeTag::Int, TypeTag::Float, |v| {
                Value::Float(v.as_float_lossy())
            }),
            (TypeTag::Int, TypeTag::Bool, |v| Value::Bool(v.as_bool_lossy())),
            (TypeTag::Bool, TypeTag::Int, |v| Value::Int(v.as_int_lossy())),
            (TypeTag::Float, TypeTag::Bool, |v| {
                Value::Bool(v.as_bool_lossy())
            }),
            (TypeTag::Bool, TypeTag::Float, |v| {
                Value::Float(v.as_float_lossy())
            }),
        ];
        for (from, to, f) in entries {
            // fresh registry, pairs are distinct
            let _ = registry.register(from, to, f);
        }
        registry
    }

    /// Register a converter for an ordered type pair.
    ///
    /// At most one converter per pair is allowed; a second registration is
    /// rejected so the active converter is never picked arbitrarily.
    pub fn register(
        &mut self,
        from: TypeTag,
        to: TypeTag,
        f: impl Fn(&Value) -> Value + 'static,
    ) -> Result<()> {
        if self.table.contains_key(&(from, to)) {
            return Err(EngineError::DuplicateConverter { from, to });
        }
        self.table.insert((from, to), Box::new(f));
        Ok(())
    }

    /// Look up the converter for an ordered pair
    pub fn get(&self, from: TypeTag, to: TypeTag) -> Option<&ConvertFn> {
        self.table.get(&(from, to))
    }

    /// Whether a converter exists for an ordered pair
    pub fn has(&self, from: TypeTag, to: TypeTag) -> bool {
        self.table.contains_key(&(from, to))
    }

    /// Number of registered converters
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_convert() {
        let mut registry = ConverterRegistry::new();
        registry
            .register(TypeTag::Float, TypeTag::Int, |v| Value::Int(v.as_int_lossy()))
            .unwrap();

        let f = registry.get(TypeTag::Float, TypeTag::Int).unwrap();
        assert_eq!(f(&Value::Float(3.7)), Value::Int(4));
        assert!(registry.get(TypeTag::Int, TypeTag::Float).is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ConverterRegistry::new();
        registry
            .register(TypeTag::Float, TypeTag::Int, |v| Value::Int(v.as_int_lossy()))
            .unwrap();
        let err = registry
            .register(TypeTag::Float, TypeTag::Int, |_| Value::Int(0))
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateConverter { .. }));
        // the original converter is still in effect
        let f = registry.get(TypeTag::Float, TypeTag::Int).unwrap();
        assert_eq!(f(&Value::Float(1.2)), Value::Int(1));
    }

    #[test]
    fn test_standard_conversions_round_trip() {
        let registry = ConverterRegistry::with_standard_conversions();
        let to_int = registry.get(TypeTag::Float, TypeTag::Int).unwrap();
        let to_float = registry.get(TypeTag::Int, TypeTag::Float).unwrap();
        let int = to_int(&Value::Float(3.7));
        assert_eq!(int, Value::Int(4));
        assert_eq!(to_float(&int), Value::Float(4.0));
    }
}
