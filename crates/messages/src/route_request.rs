//! Routed application message.

use crate::NetworkMessage;
use ringrip_types::NodeId;
use serde::{Deserialize, Serialize};

/// Application payload travelling hop by hop towards `target`.
///
/// Only the hop fields (`sender`, `destination`) change along the way;
/// `origin`, `target` and `payload` are fixed end to end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Node that sent this hop.
    pub sender: NodeId,
    /// Node this hop is addressed to (the next hop).
    pub destination: NodeId,
    /// Node that originated the request.
    pub origin: NodeId,
    /// Final recipient.
    pub target: NodeId,
    /// Opaque application content.
    pub payload: String,
}

impl RouteRequest {
    /// Create a new route request hop.
    pub fn new(
        sender: NodeId,
        destination: NodeId,
        origin: NodeId,
        target: NodeId,
        payload: String,
    ) -> Self {
        Self {
            sender,
            destination,
            origin,
            target,
            payload,
        }
    }

    /// Create a request as it first appears at its origin, before any hop.
    pub fn originate(origin: NodeId, target: NodeId, payload: String) -> Self {
        Self::new(origin, origin, origin, target, payload)
    }

    /// The next hop of this request, sent by `by` to `next_hop`.
    pub fn forwarded(&self, by: NodeId, next_hop: NodeId) -> Self {
        Self {
            sender: by,
            destination: next_hop,
            ..self.clone()
        }
    }
}

impl NetworkMessage for RouteRequest {
    fn message_type_id() -> &'static str {
        "rip.route_request"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwarded_only_rewrites_hop_fields() {
        let request = RouteRequest::originate(NodeId(0), NodeId(4), "X".to_string());
        let hop = request.forwarded(NodeId(2), NodeId(3));

        assert_eq!(hop.sender, NodeId(2));
        assert_eq!(hop.destination, NodeId(3));
        assert_eq!(hop.origin, NodeId(0));
        assert_eq!(hop.target, NodeId(4));
        assert_eq!(hop.payload, "X");
    }
}
