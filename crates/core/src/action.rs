//! Actions returned by node state machines.

use ringrip_messages::{Message, RouteRequest};
use ringrip_types::{NodeId, Round};
use serde::{Deserialize, Serialize};

/// Work the runner performs on behalf of a node.
#[derive(Debug, Clone)]
pub enum Action {
    /// Hand a message to the substrate for delivery in a later round.
    Send {
        /// Recipient of this hop.
        to: NodeId,
        /// The message to deliver.
        message: Message,
    },

    /// A routed payload reached its target.
    Deliver(Delivery),

    /// A routed payload was dropped for lack of a route.
    Drop(DroppedRequest),

    /// The node's table changed for these destinations.
    TableChanged {
        /// Destinations whose route was inserted or shortened.
        destinations: Vec<NodeId>,
    },
}

impl Action {
    /// Get a human-readable name for this action type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::Send { .. } => "Send",
            Action::Deliver(_) => "Deliver",
            Action::Drop(_) => "Drop",
            Action::TableChanged { .. } => "TableChanged",
        }
    }

    /// Check if this action emits a message.
    pub fn is_send(&self) -> bool {
        matches!(self, Action::Send { .. })
    }
}

/// A payload handed to the application layer at its target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delivery {
    /// Node that originated the request.
    pub origin: NodeId,
    /// Node that received it (always the request's target).
    pub target: NodeId,
    /// Opaque application content.
    pub payload: String,
}

impl From<RouteRequest> for Delivery {
    fn from(request: RouteRequest) -> Self {
        Self {
            origin: request.origin,
            target: request.target,
            payload: request.payload,
        }
    }
}

/// A routed request lost at a node that had no route to its target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DroppedRequest {
    /// Node where the request was dropped.
    pub at: NodeId,
    /// The request as it arrived at `at`.
    pub request: RouteRequest,
}

/// A [`Delivery`] stamped with the round in which the target handled it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// Round in which the target handled it.
    pub round: Round,
    /// What was delivered.
    pub delivery: Delivery,
}

/// A [`DroppedRequest`] stamped with the round in which it was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropRecord {
    /// Round in which it was dropped.
    pub round: Round,
    /// Where and what.
    pub dropped: DroppedRequest,
}
