//! Topology trait and static ring implementation.

use crate::NodeId;
use std::collections::BTreeSet;

/// Static network topology.
///
/// Nodes only ever talk to the neighbors returned here. The topology never
/// changes once built.
pub trait Topology: Send + Sync {
    /// Get the total number of nodes.
    fn node_count(&self) -> u32;

    /// Get the direct neighbors of a node, in ascending id order.
    ///
    /// Never contains `node` itself.
    fn neighbors(&self, node: NodeId) -> Vec<NodeId>;

    /// Length of the shortest path between two nodes.
    fn distance(&self, from: NodeId, to: NodeId) -> u32;

    /// Longest shortest path between any two nodes.
    fn diameter(&self) -> u32;

    // Derived methods

    /// Check if a node id belongs to this topology.
    fn contains(&self, node: NodeId) -> bool {
        node.0 < self.node_count()
    }

    /// Validate a node id.
    fn check(&self, node: NodeId) -> Result<NodeId, TopologyError> {
        if self.contains(node) {
            Ok(node)
        } else {
            Err(TopologyError::UnknownNode {
                node,
                node_count: self.node_count(),
            })
        }
    }

    /// Iterate over every node id.
    fn nodes(&self) -> Box<dyn Iterator<Item = NodeId> + '_> {
        Box::new((0..self.node_count()).map(NodeId))
    }

    /// Check if two nodes are directly connected.
    fn are_neighbors(&self, a: NodeId, b: NodeId) -> bool {
        self.neighbors(a).contains(&b)
    }
}

/// Ring of `N` nodes: node `i` links to `i - 1` and `i + 1` modulo `N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingTopology {
    node_count: u32,
}

impl RingTopology {
    /// Create a ring of `node_count` nodes.
    pub fn new(node_count: u32) -> Result<Self, TopologyError> {
        if node_count == 0 {
            return Err(TopologyError::Empty);
        }
        Ok(Self { node_count })
    }

    /// Predecessor of a node on the ring.
    pub fn predecessor(&self, node: NodeId) -> NodeId {
        NodeId((node.0 + self.node_count - 1) % self.node_count)
    }

    /// Successor of a node on the ring.
    pub fn successor(&self, node: NodeId) -> NodeId {
        NodeId((node.0 + 1) % self.node_count)
    }
}

impl Topology for RingTopology {
    fn node_count(&self) -> u32 {
        self.node_count
    }

    fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        // A ring of one has no links; a ring of two has a single one.
        [self.predecessor(node), self.successor(node)]
            .into_iter()
            .filter(|n| *n != node)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn distance(&self, from: NodeId, to: NodeId) -> u32 {
        let delta = from.0.abs_diff(to.0);
        delta.min(self.node_count.saturating_sub(delta))
    }

    fn diameter(&self) -> u32 {
        self.node_count / 2
    }
}

/// Errors that can occur when building or querying a topology.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    /// A topology must contain at least one node.
    #[error("topology must contain at least one node")]
    Empty,

    /// Node id is outside `[0, node_count)`.
    #[error("{node} is not part of a topology of {node_count} nodes")]
    UnknownNode {
        /// The rejected id.
        node: NodeId,
        /// Size of the topology.
        node_count: u32,
    },
}
