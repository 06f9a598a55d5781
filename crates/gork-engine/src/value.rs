//! Typed values flowing across ports
//!
//! Every value port carries one of a small set of data types. Signal ports
//! carry no value at all; pulling from one is a soft error that yields a
//! zero value.

use serde::{Deserialize, Serialize};

/// The data type of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    /// Control flow only, carries no value
    Signal,
    /// 64-bit float
    Float,
    /// 64-bit signed integer
    Int,
    /// Boolean
    Bool,
    /// Text string
    Str,
    /// Opaque/untyped value (pass-through)
    Object,
}

impl TypeTag {
    /// Whether this tag marks a control-flow-only port
    pub fn is_signal(&self) -> bool {
        matches!(self, TypeTag::Signal)
    }

    /// Short name used in diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            TypeTag::Signal => "signal",
            TypeTag::Float => "float",
            TypeTag::Int => "int",
            TypeTag::Bool => "bool",
            TypeTag::Str => "string",
            TypeTag::Object => "object",
        }
    }
}

impl Default for TypeTag {
    /// Ports default to the Signal type when unset
    fn default() -> Self {
        TypeTag::Signal
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A value produced by a node's output or stored in a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Float(f64),
    Int(i64),
    Bool(bool),
    Str(String),
    Object(serde_json::Value),
}

impl Value {
    /// The zero value for a type: `0.0`, `0`, `false`, `""`, `null`.
    ///
    /// Signal ports carry no value; asking for their zero yields `null`.
    pub fn zero(tag: TypeTag) -> Value {
        match tag {
            TypeTag::Float => Value::Float(0.0),
            TypeTag::Int => Value::Int(0),
            TypeTag::Bool => Value::Bool(false),
            TypeTag::Str => Value::Str(String::new()),
            TypeTag::Object | TypeTag::Signal => Value::Object(serde_json::Value::Null),
        }
    }

    /// The type tag of this value
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Float(_) => TypeTag::Float,
            Value::Int(_) => TypeTag::Int,
            Value::Bool(_) => TypeTag::Bool,
            Value::Str(_) => TypeTag::Str,
            Value::Object(_) => TypeTag::Object,
        }
    }

    /// Render this value as display text. Never fails; used by the string
    /// fallback of the pull protocol and by external event casts.
    pub fn to_display(&self) -> String {
        match self {
            Value::Float(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Str(v) => v.clone(),
            Value::Object(v) => v.to_string(),
        }
    }

    /// Wrap the display text as a string value
    pub fn stringify(&self) -> Value {
        Value::Str(self.to_display())
    }

    /// Cast to float with a zero fallback
    pub fn as_float_lossy(&self) -> f64 {
        match self {
            Value::Float(v) => *v,
            Value::Int(v) => *v as f64,
            Value::Bool(v) => {
                if *v {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Str(v) => v.trim().parse().unwrap_or(0.0),
            Value::Object(v) => v.as_f64().unwrap_or(0.0),
        }
    }

    /// Cast to int with a zero fallback (floats round to nearest)
    pub fn as_int_lossy(&self) -> i64 {
        match self {
            Value::Float(v) => v.round() as i64,
            Value::Int(v) => *v,
            Value::Bool(v) => i64::from(*v),
            Value::Str(v) => v.trim().parse().unwrap_or(0),
            Value::Object(v) => v.as_i64().unwrap_or(0),
        }
    }

    /// Cast to bool with a false fallback
    pub fn as_bool_lossy(&self) -> bool {
        match self {
            Value::Float(v) => *v != 0.0,
            Value::Int(v) => *v != 0,
            Value::Bool(v) => *v,
            Value::Str(v) => v.trim().eq_ignore_ascii_case("true"),
            Value::Object(v) => v.as_bool().unwrap_or(false),
        }
    }
}
