//! Constant value nodes
//!
//! Each constant holds one literal as instance data and produces it on its
//! single output port. The literal round-trips through persistence.

use gork_engine::{NodeBehavior, TypeTag, Value, ValueCtx};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConstFloat {
    pub value: f64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConstInt {
    pub value: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConstBool {
    pub value: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConstString {
    pub value: String,
}

impl ConstFloat {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl ConstInt {
    pub fn new(value: i64) -> Self {
        Self { value }
    }
}

impl ConstBool {
    pub fn new(value: bool) -> Self {
        Self { value }
    }
}

impl ConstString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

macro_rules! const_behavior {
    ($ty:ident, $to_value:expr) => {
        impl NodeBehavior for $ty {
            fn produce_value(
                &mut self,
                _ctx: &ValueCtx<'_>,
                _port: usize,
                _requested: TypeTag,
            ) -> Value {
                let produce = $to_value;
                produce(self)
            }

            fn save_data(&self) -> serde_json::Value {
                serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
            }

            fn load_data(&mut self, data: &serde_json::Value) {
                match serde_json::from_value(data.clone()) {
                    Ok(loaded) => *self = loaded,
                    Err(e) => log::warn!("bad constant instance data: {}", e),
                }
            }
        }
    };
}

const_behavior!(ConstFloat, |c: &ConstFloat| Value::Float(c.value));
const_behavior!(ConstInt, |c: &ConstInt| Value::Int(c.value));
const_behavior!(ConstBool, |c: &ConstBool| Value::Bool(c.value));
const_behavior!(ConstString, |c: &ConstString| Value::Str(c.value.clone()));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_instance_data_round_trip() {
        let saved = ConstFloat::new(3.7).save_data();
        let mut restored = ConstFloat::default();
        restored.load_data(&saved);
        assert_eq!(restored.value, 3.7);

        let saved = ConstString::new("door").save_data();
        let mut restored = ConstString::default();
        restored.load_data(&saved);
        assert_eq!(restored.value, "door");
    }
}
