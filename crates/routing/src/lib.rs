//! Distance-vector routing logic.
//!
//! Pure functions over a node's [`RoutingTable`](ringrip_types::RoutingTable):
//!
//! - [`merge`] relaxes the local table against a neighbor's advertisement
//! - [`is_complete`] decides whether a table has settled
//! - [`route`] picks deliver / forward / drop for a routed request
//!
//! None of these mutate caller state or perform I/O; the node state machine
//! owns the table and decides what to do with the results.

mod convergence;
mod merge;
mod router;

pub use convergence::{is_complete, unsettled_destinations};
pub use merge::{merge, MergeOutcome};
pub use router::{route, RouteDecision};
