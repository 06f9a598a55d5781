//! Event types for observing graph execution
//!
//! Events are sent from the reader to the host (an editor, a test harness,
//! any consumer) to report lifecycle changes as activations start, finish,
//! and are cancelled.

use serde::{Deserialize, Serialize};

use crate::node::NodeId;
use crate::reader::ActivationId;

/// Trait for sending reader events
///
/// This abstracts over the transport mechanism (channel, UI bridge, etc.)
/// allowing the reader to be observed in different contexts.
pub trait EventSink: Send + Sync {
    /// Send an event
    ///
    /// Returns an error if the event could not be sent (e.g., channel closed)
    fn send(&self, event: ReaderEvent) -> Result<(), EventError>;
}

/// Error when sending events fails
#[derive(Debug, Clone)]
pub struct EventError {
    pub message: String,
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event error: {}", self.message)
    }
}

impl std::error::Error for EventError {}

impl EventError {
    pub fn channel_closed() -> Self {
        Self {
            message: "Channel closed".to_string(),
        }
    }
}

/// Events emitted while a graph runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReaderEvent {
    /// The graph went from idle to playing
    #[serde(rename_all = "camelCase")]
    GraphStarted { graph_id: String },

    /// The graph went from playing back to idle
    #[serde(rename_all = "camelCase")]
    GraphStopped { graph_id: String },

    /// An activation began on a node's signal input
    #[serde(rename_all = "camelCase")]
    NodeActivated {
        node: NodeId,
        port: usize,
        activation_id: ActivationId,
    },

    /// An activation ran to completion
    #[serde(rename_all = "camelCase")]
    NodeCompleted {
        node: NodeId,
        activation_id: ActivationId,
    },

    /// An activation was cancelled before completing
    #[serde(rename_all = "camelCase")]
    NodeStopped {
        node: NodeId,
        activation_id: ActivationId,
    },
}

/// A no-op event sink that discards all events
///
/// Useful for testing or when events aren't needed.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: ReaderEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// A vector-based event sink that collects events
///
/// Useful for testing to verify events were emitted correctly.
pub struct VecEventSink {
    events: std::sync::Mutex<Vec<ReaderEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<ReaderEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Clear all collected events
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Default for VecEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: ReaderEvent) -> Result<(), EventError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_event_sink_collects() {
        let sink = VecEventSink::new();
        sink.send(ReaderEvent::GraphStarted {
            graph_id: "g1".to_string(),
        })
        .unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ReaderEvent::GraphStarted { graph_id } => assert_eq!(graph_id, "g1"),
            other => panic!("unexpected event: {:?}", other),
        }

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_event_serialization_shape() {
        let event = ReaderEvent::GraphStopped {
            graph_id: "g1".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "graphStopped");
        assert_eq!(json["graphId"], "g1");
    }
}
