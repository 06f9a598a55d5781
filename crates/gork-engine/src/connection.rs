//! Connection tables
//!
//! Each node keeps one list of connections per local port index, for both
//! directions. An edge is stored twice — in the source's outbound table and
//! the target's inbound table — and the graph keeps the two entries in sync.

use serde::{Deserialize, Serialize};

use crate::node::NodeId;

/// One end of an edge, as seen from the owning node's port list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// The node on the other end
    pub node: NodeId,
    /// The port index on the other end
    pub port: usize,
}

impl Connection {
    pub fn new(node: NodeId, port: usize) -> Self {
        Self { node, port }
    }
}

/// Per-port connection lists for one direction of a node
#[derive(Debug, Clone, Default)]
pub struct ConnectionTable {
    slots: Vec<Vec<Connection>>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connections at `port`, in insertion order. Unallocated ports are empty.
    pub fn get(&self, port: usize) -> &[Connection] {
        self.slots.get(port).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First connection at `port`, if any
    pub fn first(&self, port: usize) -> Option<Connection> {
        self.get(port).first().copied()
    }

    /// Append a connection, growing the table with empty lists as needed
    pub fn add(&mut self, port: usize, conn: Connection) {
        if port >= self.slots.len() {
            self.slots.resize_with(port + 1, Vec::new);
        }
        self.slots[port].push(conn);
    }

    /// Remove the first exact `(node, port)` match at `port`.
    ///
    /// Returns whether anything was removed; a miss is a silent no-op.
    pub fn remove(&mut self, port: usize, conn: Connection) -> bool {
        let Some(slot) = self.slots.get_mut(port) else {
            return false;
        };
        if let Some(pos) = slot.iter().position(|c| *c == conn) {
            slot.remove(pos);
            true
        } else {
            false
        }
    }

    /// Drop every connection that references `node`, in every slot.
    ///
    /// Used when a node is deleted from the graph.
    pub fn purge_node(&mut self, node: NodeId) {
        for slot in &mut self.slots {
            slot.retain(|c| c.node != node);
        }
    }

    /// Number of allocated port slots
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Iterate `(port, connection)` pairs over all slots
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Connection)> {
        self.slots
            .iter()
            .enumerate()
            .flat_map(|(port, conns)| conns.iter().map(move |c| (port, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_auto_expands() {
        let mut table = ConnectionTable::new();
        let peer = NodeId::new();
        table.add(3, Connection::new(peer, 0));
        assert_eq!(table.slot_count(), 4);
        assert!(table.get(0).is_empty());
        assert!(table.get(7).is_empty());
        assert_eq!(table.first(3), Some(Connection::new(peer, 0)));
    }

    #[test]
    fn test_remove_first_match_only() {
        let mut table = ConnectionTable::new();
        let peer = NodeId::new();
        table.add(0, Connection::new(peer, 1));
        table.add(0, Connection::new(peer, 1));
        assert!(table.remove(0, Connection::new(peer, 1)));
        assert_eq!(table.get(0).len(), 1);
        // miss is a no-op
        assert!(!table.remove(0, Connection::new(peer, 9)));
        assert_eq!(table.get(0).len(), 1);
    }

    #[test]
    fn test_purge_node() {
        let mut table = ConnectionTable::new();
        let a = NodeId::new();
        let b = NodeId::new();
        table.add(0, Connection::new(a, 0));
        table.add(0, Connection::new(b, 0));
        table.add(1, Connection::new(a, 2));
        table.purge_node(a);
        assert_eq!(table.get(0), &[Connection::new(b, 0)]);
        assert!(table.get(1).is_empty());
    }
}
