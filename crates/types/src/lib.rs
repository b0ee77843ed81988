//! Core types for ring distance-vector routing.
//!
//! Node identifiers, the per-node routing table and the static topology the
//! protocol runs on. Everything here is plain data with no I/O.

mod identifiers;
mod table;
mod topology;

pub use identifiers::{NodeId, Round};
pub use table::{RouteEntry, RoutingTable, TableError};
pub use topology::{RingTopology, Topology, TopologyError};
