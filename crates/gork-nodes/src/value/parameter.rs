//! Parameter access nodes
//!
//! Parameters are keyed by (name, type), so both nodes carry the full
//! identity as instance data. The get node's output is untyped; consumers
//! that need a specific type should pull through an object-accepting port
//! or convert downstream.

use gork_engine::{NodeBehavior, Poll, SignalCtx, TypeTag, Value, ValueCtx};
use serde::{Deserialize, Serialize};

/// Produces the current value of a graph parameter
#[derive(Debug, Serialize, Deserialize)]
pub struct ParamGet {
    pub name: String,
    pub ty: TypeTag,
}

impl Default for ParamGet {
    fn default() -> Self {
        Self {
            name: String::new(),
            ty: TypeTag::Float,
        }
    }
}

impl ParamGet {
    pub fn new(name: impl Into<String>, ty: TypeTag) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl NodeBehavior for ParamGet {
    fn produce_value(&mut self, ctx: &ValueCtx<'_>, _port: usize, requested: TypeTag) -> Value {
        match ctx.param(&self.name, self.ty) {
            Some(value) => value,
            None => {
                log::warn!("undeclared parameter '{}' of type {}", self.name, self.ty);
                Value::zero(requested)
            }
        }
    }

    fn save_data(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn load_data(&mut self, data: &serde_json::Value) {
        match serde_json::from_value(data.clone()) {
            Ok(loaded) => *self = loaded,
            Err(e) => log::warn!("bad parameter-get instance data: {}", e),
        }
    }
}

/// Writes a pulled value into a graph parameter, then passes the signal on
#[derive(Debug, Serialize, Deserialize)]
pub struct ParamSet {
    pub name: String,
    pub ty: TypeTag,
}

impl Default for ParamSet {
    fn default() -> Self {
        Self {
            name: String::new(),
            ty: TypeTag::Float,
        }
    }
}

impl ParamSet {
    pub const IN_SIGNAL: usize = 0;
    pub const IN_VALUE: usize = 1;

    pub fn new(name: impl Into<String>, ty: TypeTag) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Coerce a pulled value to the parameter's declared type
    fn coerce(&self, value: Value) -> Option<Value> {
        match self.ty {
            TypeTag::Float => Some(Value::Float(value.as_float_lossy())),
            TypeTag::Int => Some(Value::Int(value.as_int_lossy())),
            TypeTag::Bool => Some(Value::Bool(value.as_bool_lossy())),
            TypeTag::Str => Some(value.stringify()),
            TypeTag::Object => Some(value),
            TypeTag::Signal => None,
        }
    }
}

impl NodeBehavior for ParamSet {
    fn on_signal(&mut self, ctx: &mut SignalCtx<'_>, _port: usize) -> Poll {
        match self.coerce(ctx.input(Self::IN_VALUE)) {
            Some(value) => {
                ctx.set_param(&self.name, self.ty, value);
            }
            None => log::warn!("parameter '{}' cannot be signal-typed", self.name),
        }
        ctx.call_port(0);
        Poll::Done
    }

    fn save_data(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn load_data(&mut self, data: &serde_json::Value) {
        match serde_json::from_value(data.clone()) {
            Ok(loaded) => *self = loaded,
            Err(e) => log::warn!("bad parameter-set instance data: {}", e),
        }
    }
}
