//! End-to-end scenarios over the built-in node kinds

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use gork_engine::{
    EventKind, Graph, GraphBuilder, GraphReader, KindRegistry, NodeId, Port, ReaderEvent, TypeTag,
    Value, VecEventSink,
};

fn registry() -> KindRegistry {
    let mut registry = KindRegistry::new();
    gork_nodes::register_builtins(&mut registry);
    registry
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn tagged(graph: &Graph, tag: &str) -> NodeId {
    graph.nodes_with_tag(tag)[0]
}

fn activated_nodes(sink: &VecEventSink) -> Vec<NodeId> {
    sink.events()
        .iter()
        .filter_map(|e| match e {
            ReaderEvent::NodeActivated { node, .. } => Some(*node),
            _ => None,
        })
        .collect()
}

#[test]
fn float_constant_feeds_int_input_through_conversion() {
    init_logs();
    let registry = registry();
    let graph = GraphBuilder::new(&registry, "a", "Conversion")
        .node("const", "value/const-float")
        .with_data(serde_json::json!({ "value": 3.7 }))
        .node("wait", "flow/wait")
        .connect("const", 0, "wait", 1)
        .tag("wait", "wait")
        .build()
        .unwrap();

    let wait = tagged(&graph, "wait");
    // the int-typed ticks input rounds the float producer to nearest
    assert_eq!(graph.pull_input(wait, 1), Value::Int(4));
    // pulling is stateless; ask again
    assert_eq!(graph.pull_input(wait, 1), Value::Int(4));
}

#[test]
fn signal_chain_runs_to_completion() {
    init_logs();
    let registry = registry();
    let graph = GraphBuilder::new(&registry, "b", "Chain")
        .node("start", "flow/start")
        .node("relay", "flow/relay")
        .node("log", "debug/log")
        .node("msg", "value/const-string")
        .with_data(serde_json::json!({ "value": "done" }))
        .connect("start", 0, "relay", 0)
        .connect("relay", 0, "log", 0)
        .connect("msg", 0, "log", 1)
        .tag("start", "root")
        .build()
        .unwrap();

    let root = tagged(&graph, "root");
    let sink = Arc::new(VecEventSink::new());
    let mut reader = GraphReader::with_sink(graph, sink.clone());

    reader.start_node(root).unwrap();
    assert_eq!(reader.active_count(), 0);
    reader.tick();
    assert!(!reader.is_playing());

    let events = sink.events();
    assert!(matches!(events.first(), Some(ReaderEvent::GraphStarted { .. })));
    assert!(matches!(events.last(), Some(ReaderEvent::GraphStopped { .. })));
    // three activations (the constant is pulled, never activated)
    assert_eq!(activated_nodes(&sink).len(), 3);
    let completed = events
        .iter()
        .filter(|e| matches!(e, ReaderEvent::NodeCompleted { .. }))
        .count();
    assert_eq!(completed, 3);
}

#[test]
fn stop_graph_cancels_every_root() {
    init_logs();
    let registry = registry();
    let graph = GraphBuilder::new(&registry, "c", "TwoRoots")
        .node("ticks", "value/const-int")
        .with_data(serde_json::json!({ "value": 100 }))
        .node("wait1", "flow/wait")
        .node("wait2", "flow/wait")
        .connect("ticks", 0, "wait1", 1)
        .connect("ticks", 0, "wait2", 1)
        .tag("wait1", "w1")
        .tag("wait2", "w2")
        .build()
        .unwrap();

    let w1 = tagged(&graph, "w1");
    let w2 = tagged(&graph, "w2");
    let sink = Arc::new(VecEventSink::new());
    let mut reader = GraphReader::with_sink(graph, sink.clone());

    reader.start_node(w1).unwrap();
    reader.start_node(w2).unwrap();
    assert!(reader.is_playing());
    assert_eq!(reader.active_count(), 2);

    reader.stop_graph();
    assert!(!reader.is_playing());
    assert_eq!(reader.active_count(), 0);
    let stopped = sink
        .events()
        .iter()
        .filter(|e| matches!(e, ReaderEvent::NodeStopped { .. }))
        .count();
    assert_eq!(stopped, 2);
    assert!(matches!(
        sink.events().last(),
        Some(ReaderEvent::GraphStopped { .. })
    ));
}

#[test]
fn wait_suspends_for_pulled_tick_count() {
    init_logs();
    let registry = registry();
    let graph = GraphBuilder::new(&registry, "w", "Wait")
        .node("ticks", "value/const-int")
        .with_data(serde_json::json!({ "value": 2 }))
        .node("wait", "flow/wait")
        .node("log", "debug/log")
        .connect("ticks", 0, "wait", 1)
        .connect("wait", 0, "log", 0)
        .tag("wait", "wait")
        .tag("log", "log")
        .build()
        .unwrap();

    let wait = tagged(&graph, "wait");
    let log = tagged(&graph, "log");
    let sink = Arc::new(VecEventSink::new());
    let mut reader = GraphReader::with_sink(graph, sink.clone());

    reader.start_node(wait).unwrap();
    assert!(reader.is_playing());

    reader.tick();
    assert!(reader.is_playing());
    assert_eq!(activated_nodes(&sink), vec![wait]);

    reader.tick();
    assert!(!reader.is_playing());
    assert_eq!(activated_nodes(&sink), vec![wait, log]);
}

#[test]
fn branch_routes_on_pulled_condition() {
    init_logs();
    let registry = registry();
    for (condition, expect_true_side) in [(true, true), (false, false)] {
        let graph = GraphBuilder::new(&registry, "br", "Branch")
            .node("cond", "value/const-bool")
            .with_data(serde_json::json!({ "value": condition }))
            .node("branch", "flow/branch")
            .node("yes", "flow/relay")
            .node("no", "flow/relay")
            .connect("cond", 0, "branch", 1)
            .connect("branch", 0, "yes", 0)
            .connect("branch", 1, "no", 0)
            .tag("branch", "branch")
            .tag("yes", "yes")
            .tag("no", "no")
            .build()
            .unwrap();

        let branch = tagged(&graph, "branch");
        let yes = tagged(&graph, "yes");
        let no = tagged(&graph, "no");
        let sink = Arc::new(VecEventSink::new());
        let mut reader = GraphReader::with_sink(graph, sink.clone());

        reader.start_node(branch).unwrap();
        let taken = if expect_true_side { yes } else { no };
        assert_eq!(activated_nodes(&sink), vec![branch, taken]);
    }
}

#[test]
fn sequence_fires_custom_ports_in_order() {
    init_logs();
    let registry = registry();
    let mut graph = GraphBuilder::new(&registry, "s", "Sequence")
        .node("seq", "flow/sequence")
        .node("a", "flow/relay")
        .node("b", "flow/relay")
        .node("c", "flow/relay")
        .tag("seq", "seq")
        .tag("a", "a")
        .tag("b", "b")
        .tag("c", "c")
        .build()
        .unwrap();

    let seq = tagged(&graph, "seq");
    let steps = [tagged(&graph, "a"), tagged(&graph, "b"), tagged(&graph, "c")];
    {
        let node = graph.node_mut(seq).unwrap();
        for i in 0..steps.len() {
            node.outputs.push_custom(Port::signal(format!("step {}", i + 1)));
        }
    }
    for (port, step) in steps.iter().enumerate() {
        graph.connect(seq, port, *step, 0).unwrap();
    }

    let sink = Arc::new(VecEventSink::new());
    let mut reader = GraphReader::with_sink(graph, sink.clone());
    reader.start_node(seq).unwrap();

    assert_eq!(
        activated_nodes(&sink),
        vec![seq, steps[0], steps[1], steps[2]]
    );
    reader.tick();
    assert!(!reader.is_playing());
}

#[test]
fn parameters_flow_through_set_and_get() {
    init_logs();
    let registry = registry();
    let graph = GraphBuilder::new(&registry, "p", "Params")
        .parameter("score", TypeTag::Float, Value::Float(0.0))
        .node("start", "flow/start")
        .node("set", "value/param-set")
        .with_data(serde_json::json!({ "name": "score", "ty": "float" }))
        .node("src", "value/const-float")
        .with_data(serde_json::json!({ "value": 2.5 }))
        .node("get", "value/param-get")
        .with_data(serde_json::json!({ "name": "score", "ty": "float" }))
        .node("add", "value/add")
        .connect("start", 0, "set", 0)
        .connect("src", 0, "set", 1)
        .connect("get", 0, "add", 0)
        .tag("start", "root")
        .tag("add", "add")
        .build()
        .unwrap();

    let root = tagged(&graph, "root");
    let add = tagged(&graph, "add");
    let mut reader = GraphReader::new(graph);
    reader.start_node(root).unwrap();

    let graph = reader.graph();
    assert_eq!(graph.param("score", TypeTag::Float), Some(Value::Float(2.5)));
    // the get node feeds downstream pulls; the second operand is unconnected
    assert_eq!(graph.pull_input(add, 0), Value::Float(2.5));

    graph.reset_parameters();
    assert_eq!(graph.param("score", TypeTag::Float), Some(Value::Float(0.0)));
}

#[test]
fn emit_event_activates_bound_listener() {
    init_logs();
    let registry = registry();
    let graph = GraphBuilder::new(&registry, "e", "Events")
        .event("door_opened", EventKind::Internal)
        .node("start", "flow/start")
        .node("emit", "event/emit-event")
        .with_data(serde_json::json!({ "event": "door_opened" }))
        .node("listener", "event/on-event")
        .node("reaction", "flow/relay")
        .connect("start", 0, "emit", 0)
        .connect("listener", 0, "reaction", 0)
        .bind("door_opened", "listener")
        .tag("start", "root")
        .tag("listener", "listener")
        .tag("reaction", "reaction")
        .build()
        .unwrap();

    let root = tagged(&graph, "root");
    let listener = tagged(&graph, "listener");
    let reaction = tagged(&graph, "reaction");
    let sink = Arc::new(VecEventSink::new());
    let mut reader = GraphReader::with_sink(graph, sink.clone());

    // the whole cascade, listener included, runs inside this one call
    reader.start_node(root).unwrap();
    reader.tick();
    assert!(!reader.is_playing());
    let activated = activated_nodes(&sink);
    assert!(activated.contains(&listener));
    assert!(activated.contains(&reaction));
}

#[test]
fn call_external_reaches_host_callback() {
    init_logs();
    let registry = registry();
    let graph = GraphBuilder::new(&registry, "x", "External")
        .event("score_changed", EventKind::External)
        .node("start", "flow/start")
        .node("call", "event/call-external")
        .with_data(serde_json::json!({ "event": "score_changed" }))
        .node("payload", "value/const-float")
        .with_data(serde_json::json!({ "value": 12.5 }))
        .connect("start", 0, "call", 0)
        .connect("payload", 0, "call", 1)
        .tag("start", "root")
        .build()
        .unwrap();

    let root = tagged(&graph, "root");
    let mut reader = GraphReader::new(graph);

    let seen = Rc::new(Cell::new(0.0_f64));
    let seen_in_cb = seen.clone();
    reader.on_external_float("score_changed", move |v| seen_in_cb.set(v));

    reader.start_node(root).unwrap();
    assert_eq!(seen.get(), 12.5);
}
