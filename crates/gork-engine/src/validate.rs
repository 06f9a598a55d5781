//! Graph validation
//!
//! Walks a graph's connection tables and reports authoring problems: edges
//! that dangle, port indices out of range, signal/value crossings, pulls
//! with no registered converter, and value inputs fed by more than one
//! connection. Validation never mutates the graph; the runtime tolerates
//! all of these with logged soft failures, so issues are advisory.

use crate::graph::Graph;
use crate::node::NodeId;
use crate::value::TypeTag;

/// Advisory problem found in a graph's wiring
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// An edge references a node that no longer exists
    DanglingPeer { node: NodeId, port: usize, peer: NodeId },
    /// An edge references a port index the peer does not declare
    PeerPortOutOfRange { node: NodeId, port: usize, peer: NodeId, peer_port: usize },
    /// A signal-typed port is wired to a value-typed port (or vice versa)
    SignalValueCrossing { source: NodeId, source_port: usize, target: NodeId, target_port: usize },
    /// A typed pull has no converter registered for the pair
    MissingConverter { node: NodeId, port: usize, from: TypeTag, to: TypeTag },
    /// A value input has several producers; only the first is ever pulled
    MultipleProducers { node: NodeId, port: usize, count: usize },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingPeer { node, port, peer } => {
                write!(f, "input {} of node {} references missing node {}", port, node, peer)
            }
            Self::PeerPortOutOfRange { node, port, peer, peer_port } => {
                write!(
                    f,
                    "input {} of node {} references out-of-range port {} on node {}",
                    port, node, peer_port, peer
                )
            }
            Self::SignalValueCrossing { source, source_port, target, target_port } => {
                write!(
                    f,
                    "signal/value crossing between {}:{} and {}:{}",
                    source, source_port, target, target_port
                )
            }
            Self::MissingConverter { node, port, from, to } => {
                write!(
                    f,
                    "input {} of node {} needs a {} -> {} converter",
                    port, node, from, to
                )
            }
            Self::MultipleProducers { node, port, count } => {
                write!(
                    f,
                    "input {} of node {} has {} producers; only the first is pulled",
                    port, node, count
                )
            }
        }
    }
}

/// Inspect every inbound edge of every node
pub fn validate_graph(graph: &Graph) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for node in graph.nodes() {
        for (port, input) in node.inputs.iter().enumerate() {
            let conns = node.inbound.get(port);
            if !input.ty.is_signal() && conns.len() > 1 {
                issues.push(ValidationIssue::MultipleProducers {
                    node: node.id,
                    port,
                    count: conns.len(),
                });
            }
            for conn in conns {
                let Some(peer) = graph.node(conn.node) else {
                    issues.push(ValidationIssue::DanglingPeer {
                        node: node.id,
                        port,
                        peer: conn.node,
                    });
                    continue;
                };
                let Some(output) = peer.outputs.get(conn.port) else {
                    issues.push(ValidationIssue::PeerPortOutOfRange {
                        node: node.id,
                        port,
                        peer: conn.node,
                        peer_port: conn.port,
                    });
                    continue;
                };
                if input.ty.is_signal() != output.ty.is_signal() {
                    issues.push(ValidationIssue::SignalValueCrossing {
                        source: conn.node,
                        source_port: conn.port,
                        target: node.id,
                        target_port: port,
                    });
                    continue;
                }
                if input.ty.is_signal() {
                    continue;
                }
                let needs_converter = input.ty != output.ty
                    && input.ty != TypeTag::Object
                    && input.ty != TypeTag::Str;
                if needs_converter && !graph.converters().has(output.ty, input.ty) {
                    issues.push(ValidationIssue::MissingConverter {
                        node: node.id,
                        port,
                        from: output.ty,
                        to: input.ty,
                    });
                }
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ConverterRegistry;
    use crate::node::PassThrough;
    use crate::port::Port;

    #[test]
    fn test_clean_graph_has_no_issues() {
        let mut graph = Graph::new("g", "Clean");
        graph.set_converters(ConverterRegistry::with_standard_conversions());
        let a = graph.add_node(
            "a",
            vec![],
            vec![Port::new("out", TypeTag::Float)],
            Box::new(PassThrough),
        );
        let b = graph.add_node(
            "b",
            vec![Port::new("in", TypeTag::Int)],
            vec![],
            Box::new(PassThrough),
        );
        graph.connect(a, 0, b, 0).unwrap();
        assert!(validate_graph(&graph).is_empty());
    }

    #[test]
    fn test_missing_converter_reported() {
        let mut graph = Graph::new("g", "NoConv");
        let a = graph.add_node(
            "a",
            vec![],
            vec![Port::new("out", TypeTag::Float)],
            Box::new(PassThrough),
        );
        let b = graph.add_node(
            "b",
            vec![Port::new("in", TypeTag::Int)],
            vec![],
            Box::new(PassThrough),
        );
        graph.connect(a, 0, b, 0).unwrap();
        let issues = validate_graph(&graph);
        assert_eq!(
            issues,
            vec![ValidationIssue::MissingConverter {
                node: b,
                port: 0,
                from: TypeTag::Float,
                to: TypeTag::Int,
            }]
        );
    }

    #[test]
    fn test_multiple_producers_reported() {
        let mut graph = Graph::new("g", "TwoIn");
        let a = graph.add_node(
            "a",
            vec![],
            vec![Port::new("out", TypeTag::Float)],
            Box::new(PassThrough),
        );
        let b = graph.add_node(
            "b",
            vec![],
            vec![Port::new("out", TypeTag::Float)],
            Box::new(PassThrough),
        );
        let c = graph.add_node(
            "c",
            vec![Port::new("in", TypeTag::Float)],
            vec![],
            Box::new(PassThrough),
        );
        graph.connect(a, 0, c, 0).unwrap();
        graph.connect(b, 0, c, 0).unwrap();
        let issues = validate_graph(&graph);
        assert!(issues.contains(&ValidationIssue::MultipleProducers {
            node: c,
            port: 0,
            count: 2,
        }));
    }

    #[test]
    fn test_signal_value_crossing_reported() {
        let mut graph = Graph::new("g", "Crossed");
        let a = graph.add_node(
            "a",
            vec![],
            vec![Port::signal("out")],
            Box::new(PassThrough),
        );
        let b = graph.add_node(
            "b",
            vec![Port::new("in", TypeTag::Float)],
            vec![],
            Box::new(PassThrough),
        );
        graph.connect(a, 0, b, 0).unwrap();
        let issues = validate_graph(&graph);
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            issues[0],
            ValidationIssue::SignalValueCrossing { .. }
        ));
    }
}
