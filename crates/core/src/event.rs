//! Inbound events for node state machines.

use ringrip_messages::Message;
use ringrip_types::NodeId;
use serde::{Deserialize, Serialize};

/// Everything a node can be asked to react to.
#[derive(Debug, Clone)]
pub enum Event {
    /// Run the Init step: announce the initial table to every neighbor.
    Start,

    /// The substrate handed this node its message for the current round.
    MessageReceived(Message),

    /// The application on this node wants `payload` routed to `target`.
    RouteRequested {
        /// Final recipient.
        target: NodeId,
        /// Opaque application content.
        payload: String,
    },
}

impl Event {
    /// Get a human-readable name for this event type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::Start => "Start",
            Event::MessageReceived(_) => "MessageReceived",
            Event::RouteRequested { .. } => "RouteRequested",
        }
    }
}

/// An application request to route `payload` from `origin` to `target`.
///
/// Harnesses hold these until they hand them to the origin node as
/// [`Event::RouteRequested`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteOrder {
    /// Node that originates the request.
    pub origin: NodeId,
    /// Final recipient.
    pub target: NodeId,
    /// Opaque application content.
    pub payload: String,
}

impl RouteOrder {
    /// Create a new order.
    pub fn new(origin: NodeId, target: NodeId, payload: impl Into<String>) -> Self {
        Self {
            origin,
            target,
            payload: payload.into(),
        }
    }

    /// The event to hand to the origin node.
    pub fn into_event(self) -> Event {
        Event::RouteRequested {
            target: self.target,
            payload: self.payload,
        }
    }
}
