//! Built-in kind registration
//!
//! Hosts call [`register_builtins`] on their registry at startup. Each kind
//! registers its palette metadata (label, category, color, declared ports)
//! together with a behavior factory.

use gork_engine::{KindRegistry, NodeKindMetadata, PortSpec, TypeTag};

use crate::debug::LogNode;
use crate::event::{CallExternal, EmitEvent, OnEvent};
use crate::flow::{Branch, Relay, Sequence, Start, Wait};
use crate::value::{Add, ConstBool, ConstFloat, ConstInt, ConstString, ParamGet, ParamSet};

const FLOW_COLOR: &str = "#e8873a";
const VALUE_COLOR: &str = "#3a9fe8";
const EVENT_COLOR: &str = "#9b59b6";
const DEBUG_COLOR: &str = "#7f8c8d";

/// Register every built-in node kind
pub fn register_builtins(registry: &mut KindRegistry) {
    register_flow(registry);
    register_value(registry);
    register_event(registry);
    register_debug(registry);
}

fn register_flow(registry: &mut KindRegistry) {
    registry.register_fn(
        NodeKindMetadata::new("flow/start", "Start", "Flow")
            .with_color(FLOW_COLOR)
            .with_outputs(vec![PortSpec::signal("out")]),
        || Box::new(Start),
    );
    registry.register_fn(
        NodeKindMetadata::new("flow/relay", "Relay", "Flow")
            .with_color(FLOW_COLOR)
            .with_inputs(vec![PortSpec::signal("in")])
            .with_outputs(vec![PortSpec::signal("out")]),
        || Box::new(Relay),
    );
    registry.register_fn(
        NodeKindMetadata::new("flow/branch", "Branch", "Flow")
            .with_color(FLOW_COLOR)
            .with_inputs(vec![
                PortSpec::signal("in"),
                PortSpec::new("condition", TypeTag::Bool),
            ])
            .with_outputs(vec![PortSpec::signal("true"), PortSpec::signal("false")]),
        || Box::new(Branch),
    );
    // outputs are all custom, added per instance
    registry.register_fn(
        NodeKindMetadata::new("flow/sequence", "Sequence", "Flow")
            .with_color(FLOW_COLOR)
            .with_inputs(vec![PortSpec::signal("in")]),
        || Box::new(Sequence),
    );
    registry.register_fn(
        NodeKindMetadata::new("flow/wait", "Wait", "Flow")
            .with_color(FLOW_COLOR)
            .with_inputs(vec![
                PortSpec::signal("in"),
                PortSpec::new("ticks", TypeTag::Int),
            ])
            .with_outputs(vec![PortSpec::signal("out")]),
        || Box::new(Wait),
    );
}

fn register_value(registry: &mut KindRegistry) {
    registry.register_fn(
        NodeKindMetadata::new("value/const-float", "Float", "Value")
            .with_color(VALUE_COLOR)
            .with_outputs(vec![PortSpec::new("value", TypeTag::Float)]),
        || Box::new(ConstFloat::default()),
    );
    registry.register_fn(
        NodeKindMetadata::new("value/const-int", "Integer", "Value")
            .with_color(VALUE_COLOR)
            .with_outputs(vec![PortSpec::new("value", TypeTag::Int)]),
        || Box::new(ConstInt::default()),
    );
    registry.register_fn(
        NodeKindMetadata::new("value/const-bool", "Boolean", "Value")
            .with_color(VALUE_COLOR)
            .with_outputs(vec![PortSpec::new("value", TypeTag::Bool)]),
        || Box::new(ConstBool::default()),
    );
    registry.register_fn(
        NodeKindMetadata::new("value/const-string", "String", "Value")
            .with_color(VALUE_COLOR)
            .with_outputs(vec![PortSpec::new("value", TypeTag::Str)]),
        || Box::new(ConstString::default()),
    );
    registry.register_fn(
        NodeKindMetadata::new("value/param-get", "Get Parameter", "Value")
            .with_color(VALUE_COLOR)
            .with_outputs(vec![PortSpec::new("value", TypeTag::Object)]),
        || Box::new(ParamGet::default()),
    );
    registry.register_fn(
        NodeKindMetadata::new("value/param-set", "Set Parameter", "Value")
            .with_color(VALUE_COLOR)
            .with_inputs(vec![
                PortSpec::signal("in"),
                PortSpec::new("value", TypeTag::Object),
            ])
            .with_outputs(vec![PortSpec::signal("out")]),
        || Box::new(ParamSet::default()),
    );
    registry.register_fn(
        NodeKindMetadata::new("value/add", "Add", "Value")
            .with_color(VALUE_COLOR)
            .with_inputs(vec![
                PortSpec::new("a", TypeTag::Object),
                PortSpec::new("b", TypeTag::Object),
            ])
            .with_outputs(vec![PortSpec::new("sum", TypeTag::Float)]),
        || Box::new(Add),
    );
}

fn register_event(registry: &mut KindRegistry) {
    registry.register_fn(
        NodeKindMetadata::new("event/on-event", "On Event", "Event")
            .with_color(EVENT_COLOR)
            .with_outputs(vec![PortSpec::signal("out")]),
        || Box::new(OnEvent),
    );
    registry.register_fn(
        NodeKindMetadata::new("event/emit-event", "Emit Event", "Event")
            .with_color(EVENT_COLOR)
            .with_inputs(vec![PortSpec::signal("in")])
            .with_outputs(vec![PortSpec::signal("out")]),
        || Box::new(EmitEvent::default()),
    );
    registry.register_fn(
        NodeKindMetadata::new("event/call-external", "Call External", "Event")
            .with_color(EVENT_COLOR)
            .with_inputs(vec![
                PortSpec::signal("in"),
                PortSpec::new("payload", TypeTag::Object),
            ])
            .with_outputs(vec![PortSpec::signal("out")]),
        || Box::new(CallExternal::default()),
    );
}

fn register_debug(registry: &mut KindRegistry) {
    registry.register_fn(
        NodeKindMetadata::new("debug/log", "Log", "Debug")
            .with_color(DEBUG_COLOR)
            .with_inputs(vec![
                PortSpec::signal("in"),
                PortSpec::new("message", TypeTag::Str),
            ])
            .with_outputs(vec![PortSpec::signal("out")]),
        || Box::new(LogNode),
    );
}
