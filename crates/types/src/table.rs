//! Distance-vector routing table.
//!
//! A table maps every destination a node knows about to the neighbor it
//! forwards through and the hop count along that path. Tables are backed by a
//! persistent ordered map, so the snapshot attached to each table update is a
//! constant-time clone that shares structure with the owner's live table.

use crate::NodeId;
use im::OrdMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors from decoding a routing table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The table has no entry for its owner.
    #[error("table of {0} has no entry for its owner")]
    MissingOwnerEntry(NodeId),

    /// The owner's entry is not distance 0 through itself.
    #[error("table of {owner} maps its owner to ({}, {})", entry.next_hop.0, entry.distance)]
    InvalidOwnerEntry {
        /// Owner of the table.
        owner: NodeId,
        /// The offending entry.
        entry: RouteEntry,
    },
}

/// Route to a single destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Neighbor the node forwards through.
    pub next_hop: NodeId,
    /// Hop count along the path currently known to the node.
    pub distance: u32,
}

impl RouteEntry {
    /// Create a new route entry.
    pub fn new(next_hop: NodeId, distance: u32) -> Self {
        Self { next_hop, distance }
    }

    /// The fixed entry a node holds for itself.
    pub fn local(owner: NodeId) -> Self {
        Self::new(owner, 0)
    }

    /// Entry for a directly connected neighbor.
    pub fn direct(neighbor: NodeId) -> Self {
        Self::new(neighbor, 1)
    }
}

/// Routing table owned by a single node.
///
/// Always contains the owner's own entry with distance 0 routed through
/// itself. That entry can never be replaced, and decoding rejects a table
/// without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRoutingTable")]
pub struct RoutingTable {
    owner: NodeId,
    entries: OrdMap<NodeId, RouteEntry>,
}

/// Wire form of a [`RoutingTable`], checked before it becomes one.
#[derive(Deserialize)]
struct RawRoutingTable {
    owner: NodeId,
    entries: OrdMap<NodeId, RouteEntry>,
}

impl TryFrom<RawRoutingTable> for RoutingTable {
    type Error = TableError;

    fn try_from(raw: RawRoutingTable) -> Result<Self, TableError> {
        let RawRoutingTable { owner, entries } = raw;
        match entries.get(&owner) {
            None => Err(TableError::MissingOwnerEntry(owner)),
            Some(entry) if *entry != RouteEntry::local(owner) => {
                Err(TableError::InvalidOwnerEntry {
                    owner,
                    entry: *entry,
                })
            }
            Some(_) => Ok(Self { owner, entries }),
        }
    }
}

impl RoutingTable {
    /// Create a table holding only the owner's own entry.
    pub fn new(owner: NodeId) -> Self {
        let mut entries = OrdMap::new();
        entries.insert(owner, RouteEntry::local(owner));
        Self { owner, entries }
    }

    /// Create the initial table of a node: itself at distance 0 and each
    /// direct neighbor at distance 1.
    pub fn with_neighbors(owner: NodeId, neighbors: impl IntoIterator<Item = NodeId>) -> Self {
        let mut table = Self::new(owner);
        for neighbor in neighbors {
            table.update(neighbor, RouteEntry::direct(neighbor));
        }
        table
    }

    /// Build a table from explicit entries.
    ///
    /// Any entry given for the owner is ignored in favour of the fixed
    /// distance-0 entry.
    pub fn from_entries(
        owner: NodeId,
        entries: impl IntoIterator<Item = (NodeId, RouteEntry)>,
    ) -> Self {
        let mut table = Self::new(owner);
        for (destination, entry) in entries {
            table.update(destination, entry);
        }
        table
    }

    /// The node that owns this table.
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Get the route to a destination.
    pub fn get(&self, destination: NodeId) -> Option<&RouteEntry> {
        self.entries.get(&destination)
    }

    /// Get the next hop towards a destination.
    pub fn next_hop(&self, destination: NodeId) -> Option<NodeId> {
        self.get(destination).map(|entry| entry.next_hop)
    }

    /// Get the stored distance to a destination.
    pub fn distance(&self, destination: NodeId) -> Option<u32> {
        self.get(destination).map(|entry| entry.distance)
    }

    /// Check whether a route to the destination is known.
    pub fn contains(&self, destination: NodeId) -> bool {
        self.entries.contains_key(&destination)
    }

    /// Set the route to a destination.
    ///
    /// Returns `false` without touching the table when `destination` is the
    /// owner.
    pub fn update(&mut self, destination: NodeId, entry: RouteEntry) -> bool {
        if destination == self.owner {
            return false;
        }
        self.entries.insert(destination, entry);
        true
    }

    /// Number of entries, including the owner's own entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A table always holds its owner's entry, so this is never true.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of destinations other than the owner.
    pub fn destination_count(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// Iterate over all entries in ascending destination order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, RouteEntry)> + '_ {
        self.entries.iter().map(|(destination, entry)| (*destination, *entry))
    }

    /// Iterate over the destinations other than the owner.
    pub fn destinations(&self) -> impl Iterator<Item = NodeId> + '_ {
        let owner = self.owner;
        self.entries.keys().copied().filter(move |d| *d != owner)
    }

    /// Largest stored distance (0 for a table that only knows its owner).
    pub fn max_distance(&self) -> u32 {
        self.entries
            .values()
            .map(|entry| entry.distance)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for RoutingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (destination, entry)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(
                f,
                "{}: ({}, {})",
                destination.0, entry.next_hop.0, entry.distance
            )?;
        }
        write!(f, "}}")
    }
}
