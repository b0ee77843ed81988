//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node identifier.
///
/// Ids are dense in `[0, N)` and double as the node's position on the ring.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Get the raw id value.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Position of this node as an index into per-node vectors.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        NodeId(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Global round number of the synchronous substrate.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Round(pub u64);

impl Round {
    /// The round in which nodes run their Init step.
    pub const ZERO: Self = Round(0);

    /// Get the next round.
    pub fn next(self) -> Self {
        Round(self.0 + 1)
    }

    /// Number of rounds elapsed since `earlier` (zero if `earlier` is later).
    pub fn since(self, earlier: Round) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Round({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_next_and_since() {
        let round = Round(10);
        assert_eq!(round.next(), Round(11));
        assert_eq!(Round(15).since(round), 5);
        assert_eq!(round.since(Round(15)), 0);
        assert_eq!(Round::ZERO.next(), Round(1));
    }

    #[test]
    fn test_node_id_display_and_index() {
        let id = NodeId::from(3);
        assert_eq!(id.to_string(), "Node(3)");
        assert_eq!(id.index(), 3);
        assert_eq!(id.get(), 3);
    }
}
