//! Add node

use gork_engine::{NodeBehavior, TypeTag, Value, ValueCtx};

/// Sums two pulled inputs as floats.
///
/// The inputs are untyped so any numeric producer (or a parameter get)
/// connects directly; each operand is coerced with the lossy float cast.
/// Unconnected operands contribute zero.
#[derive(Debug, Default)]
pub struct Add;

impl NodeBehavior for Add {
    fn produce_value(&mut self, ctx: &ValueCtx<'_>, _port: usize, _requested: TypeTag) -> Value {
        let a = ctx.input(0).as_float_lossy();
        let b = ctx.input(1).as_float_lossy();
        Value::Float(a + b)
    }
}
