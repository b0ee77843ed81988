//! Forwarding decisions for routed requests.

use ringrip_messages::RouteRequest;
use ringrip_types::{NodeId, RoutingTable};

/// What a node does with a routed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// The request reached its target; hand the payload to the application.
    Deliver(RouteRequest),

    /// Send this rewritten hop to its `destination`.
    Forward(RouteRequest),

    /// No route to the target is known; the request is lost.
    Drop(RouteRequest),
}

/// Decide what node `local` does with `request` given its current table.
///
/// Routing is best effort: before convergence a request may meet a node that
/// does not know its target yet, in which case it is dropped without retry.
pub fn route(local: NodeId, table: &RoutingTable, request: RouteRequest) -> RouteDecision {
    if request.target == local {
        return RouteDecision::Deliver(request);
    }

    match table.next_hop(request.target) {
        Some(next_hop) => RouteDecision::Forward(request.forwarded(local, next_hop)),
        None => RouteDecision::Drop(request),
    }
}
