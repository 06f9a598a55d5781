//! Graph persistence
//!
//! Graphs serialize to a flat document: node records (with custom ports and
//! per-behavior instance data), one record per connection, and the declared
//! parameters, events, and listener bindings. Only outbound edges are
//! written; the mirrored inbound half is rebuilt on load. Node identity is
//! preserved across a round-trip.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::{EventKind, Graph};
use crate::node::NodeId;
use crate::port::Port;
use crate::registry::{KindRegistry, PortSpec};
use crate::value::{TypeTag, Value};

/// Serialized form of a whole graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDocument {
    pub id: String,
    pub name: String,
    pub nodes: Vec<NodeRecord>,
    pub connections: Vec<ConnectionRecord>,
    #[serde(default)]
    pub parameters: Vec<ParameterRecord>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub listeners: Vec<ListenerRecord>,
}

/// One node: kind, tags, custom ports, and behavior instance data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    pub kind: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub custom_inputs: Vec<PortSpec>,
    #[serde(default)]
    pub custom_outputs: Vec<PortSpec>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// One directed edge, stored from the source side only
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub source: NodeId,
    pub source_port: usize,
    pub target: NodeId,
    pub target_port: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterRecord {
    pub name: String,
    pub ty: TypeTag,
    pub start: Value,
    pub current: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub name: String,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerRecord {
    pub event: String,
    pub node: NodeId,
}

/// Capture a graph into a document
pub fn save_graph(graph: &Graph) -> GraphDocument {
    let mut nodes = Vec::new();
    let mut connections = Vec::new();
    for node in graph.nodes() {
        let data = graph
            .with_behavior(node.id, |b| b.save_data())
            .unwrap_or(serde_json::Value::Null);
        nodes.push(NodeRecord {
            id: node.id,
            kind: node.kind.clone(),
            tags: node.tags.iter().cloned().collect(),
            custom_inputs: node
                .inputs
                .custom()
                .iter()
                .map(|p| PortSpec::new(p.name.clone(), p.ty))
                .collect(),
            custom_outputs: node
                .outputs
                .custom()
                .iter()
                .map(|p| PortSpec::new(p.name.clone(), p.ty))
                .collect(),
            data,
        });
        for (port, conn) in node.outbound.iter() {
            connections.push(ConnectionRecord {
                source: node.id,
                source_port: port,
                target: conn.node,
                target_port: conn.port,
            });
        }
    }
    let parameters = graph
        .params()
        .iter()
        .map(|(name, ty, start, current)| ParameterRecord {
            name: name.to_string(),
            ty,
            start: start.clone(),
            current: current.clone(),
        })
        .collect();
    let events = graph
        .events()
        .map(|(name, kind)| EventRecord {
            name: name.to_string(),
            kind,
        })
        .collect();
    let listeners = graph
        .listener_bindings()
        .map(|(event, node)| ListenerRecord {
            event: event.to_string(),
            node,
        })
        .collect();
    GraphDocument {
        id: graph.id().to_string(),
        name: graph.name().to_string(),
        nodes,
        connections,
        parameters,
        events,
        listeners,
    }
}

/// Rebuild a graph from a document.
///
/// Behaviors come from the registry; the loaded graph carries the standard
/// converter set, so callers with custom converters re-register them after
/// loading.
pub fn load_graph(doc: &GraphDocument, registry: &KindRegistry) -> Result<Graph> {
    let mut graph = Graph::new(doc.id.clone(), doc.name.clone());
    graph.set_converters(crate::convert::ConverterRegistry::with_standard_conversions());

    for record in &doc.nodes {
        let id = graph.spawn_with_id(registry, &record.kind, record.id)?;
        if let Some(node) = graph.node_mut(id) {
            for spec in &record.custom_inputs {
                node.inputs.push_custom(Port::new(spec.name.clone(), spec.ty));
            }
            for spec in &record.custom_outputs {
                node.outputs.push_custom(Port::new(spec.name.clone(), spec.ty));
            }
        }
        for tag in &record.tags {
            graph.add_tag(id, tag.clone());
        }
        if !record.data.is_null() {
            graph.with_behavior(id, |b| b.load_data(&record.data));
        }
    }
    for record in &doc.connections {
        graph.connect(
            record.source,
            record.source_port,
            record.target,
            record.target_port,
        )?;
    }
    for record in &doc.events {
        graph.declare_event(record.name.clone(), record.kind)?;
    }
    for record in &doc.listeners {
        graph.bind_internal_event(record.event.clone(), record.node)?;
    }
    for record in &doc.parameters {
        graph.declare_parameter(record.name.clone(), record.ty, record.start.clone())?;
        graph.restore_param(&record.name, record.ty, record.current.clone());
    }
    Ok(graph)
}

/// Serialize a document to pretty JSON
pub fn to_json(doc: &GraphDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Parse a document from JSON
pub fn from_json(json: &str) -> Result<GraphDocument> {
    Ok(serde_json::from_str(json)?)
}

/// Save a graph straight to a JSON file
pub fn save_to_file(graph: &Graph, path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path, to_json(&save_graph(graph))?)?;
    Ok(())
}

/// Load a graph straight from a JSON file
pub fn load_from_file(path: impl AsRef<Path>, registry: &KindRegistry) -> Result<Graph> {
    let json = std::fs::read_to_string(path)?;
    load_graph(&from_json(&json)?, registry)
}
