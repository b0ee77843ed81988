//! Table update message.

use crate::NetworkMessage;
use ringrip_types::{NodeId, RoutingTable};
use serde::{Deserialize, Serialize};

/// Snapshot of a node's routing table sent to one neighbor.
///
/// Created at broadcast time and consumed on receipt. The snapshot shares
/// structure with the sender's live table but never observes later changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableUpdate {
    /// Node that advertised the table.
    pub sender: NodeId,
    /// Neighbor the update is addressed to.
    pub destination: NodeId,
    /// The advertised table.
    pub table: RoutingTable,
}

impl TableUpdate {
    /// Create a new table update.
    pub fn new(sender: NodeId, destination: NodeId, table: RoutingTable) -> Self {
        Self {
            sender,
            destination,
            table,
        }
    }

    /// Get a reference to the advertised table.
    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Consume and return the advertised table.
    pub fn into_table(self) -> RoutingTable {
        self.table
    }
}

impl NetworkMessage for TableUpdate {
    fn message_type_id() -> &'static str {
        "rip.table_update"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringrip_test_helpers::table;

    #[test]
    fn test_table_update_carries_snapshot() {
        let advertised = table(1, &[(1, 1, 0), (0, 0, 1), (2, 2, 1)]);
        let update = TableUpdate::new(NodeId(1), NodeId(2), advertised.clone());

        assert_eq!(update.table(), &advertised);
        assert_eq!(update.into_table().owner(), NodeId(1));
    }

    #[test]
    fn test_decoding_update_with_broken_table_fails() {
        let missing = r#"{"sender":1,"destination":2,"table":{"owner":1,"entries":{}}}"#;
        assert!(serde_json::from_str::<TableUpdate>(missing).is_err());

        let rewritten = r#"{"sender":1,"destination":2,"table":{"owner":1,"entries":{"1":{"next_hop":3,"distance":7}}}}"#;
        assert!(serde_json::from_str::<TableUpdate>(rewritten).is_err());

        let valid = r#"{"sender":1,"destination":2,"table":{"owner":1,"entries":{"1":{"next_hop":1,"distance":0},"2":{"next_hop":2,"distance":1}}}}"#;
        let update: TableUpdate = serde_json::from_str(valid).unwrap();
        assert_eq!(update.table().destination_count(), 1);
    }
}
