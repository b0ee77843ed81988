//! Test fixtures for ringrip crates.
//!
//! Tables are written as `(destination, next_hop, distance)` triples so that
//! scenarios read like the routing tables they describe.

use ringrip_types::{NodeId, RingTopology, RouteEntry, RoutingTable, Topology};

/// Build a table owned by `owner` from `(destination, next_hop, distance)`
/// triples. The owner's own entry is always present at distance 0.
pub fn table(owner: u32, entries: &[(u32, u32, u32)]) -> RoutingTable {
    RoutingTable::from_entries(
        NodeId(owner),
        entries.iter().map(|&(destination, next_hop, distance)| {
            (NodeId(destination), RouteEntry::new(NodeId(next_hop), distance))
        }),
    )
}

/// Build a ring topology, panicking on an empty ring.
pub fn ring(node_count: u32) -> RingTopology {
    RingTopology::new(node_count).expect("test ring must not be empty")
}

/// The table a ring node holds right after its Init step.
pub fn initial_ring_table(node_count: u32, owner: u32) -> RoutingTable {
    let ring = ring(node_count);
    RoutingTable::with_neighbors(NodeId(owner), ring.neighbors(NodeId(owner)))
}

/// The fully converged table of a ring node.
///
/// Destinations exactly opposite the owner on an even ring are reached
/// through the successor.
pub fn converged_ring_table(node_count: u32, owner: u32) -> RoutingTable {
    let ring = ring(node_count);
    let me = NodeId(owner);
    RoutingTable::from_entries(
        me,
        ring.nodes().filter(|d| *d != me).map(|destination| {
            let distance = ring.distance(me, destination);
            let clockwise = (destination.0 + node_count - owner) % node_count;
            let next_hop = if clockwise <= node_count / 2 {
                ring.successor(me)
            } else {
                ring.predecessor(me)
            };
            (destination, RouteEntry::new(next_hop, distance))
        }),
    )
}
