//! Convergence detection.

use ringrip_types::{NodeId, RoutingTable};

/// Whether a table is complete for a ring of `node_count` nodes.
///
/// Complete means a route to every other node is known and no stored
/// distance exceeds the ring diameter `floor(node_count / 2)`. A longer
/// distance is a route that has not settled yet.
pub fn is_complete(table: &RoutingTable, node_count: u32) -> bool {
    let others = (node_count as usize).saturating_sub(1);
    let bound = node_count / 2;

    table.destination_count() >= others && table.iter().all(|(_, entry)| entry.distance <= bound)
}

/// Destinations that keep a table from being complete: unknown ones and
/// those still above the diameter bound. Ascending order.
pub fn unsettled_destinations(table: &RoutingTable, node_count: u32) -> Vec<NodeId> {
    let bound = node_count / 2;
    (0..node_count)
        .map(NodeId)
        .filter(|destination| match table.distance(*destination) {
            None => true,
            Some(distance) => distance > bound,
        })
        .collect()
}
