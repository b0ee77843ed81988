//! Distance-vector relaxation.

use ringrip_types::{NodeId, RouteEntry, RoutingTable};

/// Result of merging a neighbor's table into the local one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// At least one route was inserted or shortened.
    Changed {
        /// The updated local table.
        table: RoutingTable,
        /// Destinations whose route changed, in ascending order.
        destinations: Vec<NodeId>,
    },

    /// Nothing would change; the caller should not re-broadcast.
    Unchanged,
}

impl MergeOutcome {
    /// Check if the merge changed the table.
    pub fn is_changed(&self) -> bool {
        matches!(self, MergeOutcome::Changed { .. })
    }

    /// The updated table, or `None` when nothing changed.
    pub fn into_table(self) -> Option<RoutingTable> {
        match self {
            MergeOutcome::Changed { table, .. } => Some(table),
            MergeOutcome::Unchanged => None,
        }
    }
}

/// Merge `received`, advertised by neighbor `source`, into `local`.
///
/// Every advertised destination becomes a candidate route through `source`
/// one hop longer than advertised. A candidate replaces the local entry only
/// when the destination is unknown or the candidate is strictly shorter, so
/// stored distances never increase and ties keep the existing route. The
/// owner's own distance-0 entry can never be beaten.
///
/// No split horizon or poison reverse is applied. Correctness is only
/// claimed for static topologies.
pub fn merge(local: &RoutingTable, source: NodeId, received: &RoutingTable) -> MergeOutcome {
    let mut table = local.clone();
    let mut destinations = Vec::new();

    for (destination, advertised) in received.iter() {
        let candidate = advertised.distance.saturating_add(1);
        let shorter = match table.distance(destination) {
            None => true,
            Some(current) => candidate < current,
        };

        if shorter && table.update(destination, RouteEntry::new(source, candidate)) {
            destinations.push(destination);
        }
    }

    if destinations.is_empty() {
        MergeOutcome::Unchanged
    } else {
        MergeOutcome::Changed {
            table,
            destinations,
        }
    }
}
