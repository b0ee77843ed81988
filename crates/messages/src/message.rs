//! The message envelope carried by the substrate.

use crate::{RouteRequest, TableUpdate};
use ringrip_types::NodeId;
use serde::{Deserialize, Serialize};

/// A message type that can travel between nodes.
pub trait NetworkMessage {
    /// Stable identifier for this message type, used in logs and by any
    /// networked runner that needs to tag frames.
    fn message_type_id() -> &'static str;
}

/// Any message a node can receive.
///
/// Code outside this crate must match with a fallback arm; a message kind
/// it does not understand is an integration error, never a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Message {
    /// A neighbor's routing table.
    TableUpdate(TableUpdate),

    /// A routed application message on one of its hops.
    RouteRequest(RouteRequest),
}

impl Message {
    /// Get a human-readable name for this message type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Message::TableUpdate(_) => TableUpdate::message_type_id(),
            Message::RouteRequest(_) => RouteRequest::message_type_id(),
        }
    }

    /// The node that sent this hop.
    pub fn sender(&self) -> NodeId {
        match self {
            Message::TableUpdate(update) => update.sender,
            Message::RouteRequest(request) => request.sender,
        }
    }

    /// The node this hop is addressed to.
    pub fn destination(&self) -> NodeId {
        match self {
            Message::TableUpdate(update) => update.destination,
            Message::RouteRequest(request) => request.destination,
        }
    }

    /// Check if this is a table update.
    pub fn is_table_update(&self) -> bool {
        matches!(self, Message::TableUpdate(_))
    }

    /// Check if this is a routed request.
    pub fn is_route_request(&self) -> bool {
        matches!(self, Message::RouteRequest(_))
    }
}

impl From<TableUpdate> for Message {
    fn from(update: TableUpdate) -> Self {
        Message::TableUpdate(update)
    }
}

impl From<RouteRequest> for Message {
    fn from(request: RouteRequest) -> Self {
        Message::RouteRequest(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringrip_types::RoutingTable;

    #[test]
    fn test_message_addressing() {
        let update: Message =
            TableUpdate::new(NodeId(1), NodeId(2), RoutingTable::new(NodeId(1))).into();
        assert_eq!(update.sender(), NodeId(1));
        assert_eq!(update.destination(), NodeId(2));
        assert_eq!(update.type_name(), "rip.table_update");
        assert!(update.is_table_update());

        let request: Message =
            RouteRequest::originate(NodeId(0), NodeId(4), "X".to_string()).into();
        assert_eq!(request.sender(), NodeId(0));
        assert_eq!(request.destination(), NodeId(0));
        assert_eq!(request.type_name(), "rip.route_request");
        assert!(request.is_route_request());
    }

    #[test]
    fn test_message_serde_preserves_fields() {
        let message: Message = RouteRequest::new(
            NodeId(2),
            NodeId(3),
            NodeId(0),
            NodeId(4),
            "payload".to_string(),
        )
        .into();

        let json = serde_json::to_string(&message).unwrap();
        let decoded: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, message);
    }
}
