//! Node state machine.

use ringrip_core::{Action, DroppedRequest, Event, ProtocolError, StateMachine};
use ringrip_messages::{Message, RouteRequest, TableUpdate};
use ringrip_routing::{is_complete, merge, route, MergeOutcome, RouteDecision};
use ringrip_types::{NodeId, Round, RoutingTable, Topology, TopologyError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Lifecycle of a node.
///
/// There is no terminal phase: stopping a node is the runner's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodePhase {
    /// Table built, nothing announced yet.
    Init,
    /// Initial table broadcast; processing messages.
    Active,
}

/// Per-node protocol counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStats {
    /// Table updates received.
    pub updates_received: u64,
    /// Updates that changed the table.
    pub table_changes: u64,
    /// Table broadcasts (one per neighbor set, not per message).
    pub broadcasts: u64,
    /// Routed requests delivered here.
    pub delivered: u64,
    /// Routed requests forwarded to a next hop.
    pub forwarded: u64,
    /// Routed requests dropped for lack of a route.
    pub dropped: u64,
}

/// Routing node on a static topology.
///
/// Owns its routing table exclusively. The table only changes through
/// [`merge`] on received table updates, and every change is announced to all
/// neighbors.
pub struct NodeStateMachine {
    /// This node's id.
    id: NodeId,

    /// Network topology (single source of truth for neighbors and size).
    topology: Arc<dyn Topology>,

    /// Direct neighbors, cached from the topology.
    neighbors: Vec<NodeId>,

    /// The routing table.
    table: RoutingTable,

    /// Lifecycle phase.
    phase: NodePhase,

    /// Current round, set by the runner.
    round: Round,

    /// Round in which the table first became complete.
    completed_at: Option<Round>,

    /// Protocol counters.
    stats: NodeStats,
}

impl NodeStateMachine {
    /// Create a node and build its initial table: itself at distance 0 and
    /// each neighbor at distance 1.
    pub fn new(id: NodeId, topology: Arc<dyn Topology>) -> Result<Self, TopologyError> {
        topology.check(id)?;
        let neighbors = topology.neighbors(id);
        let table = RoutingTable::with_neighbors(id, neighbors.iter().copied());

        Ok(Self {
            id,
            topology,
            neighbors,
            table,
            phase: NodePhase::Init,
            round: Round::ZERO,
            completed_at: None,
            stats: NodeStats::default(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════════

    /// Get the current routing table.
    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Get the direct neighbors.
    pub fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }

    /// Get the lifecycle phase.
    pub fn phase(&self) -> NodePhase {
        self.phase
    }

    /// Get the protocol counters.
    pub fn stats(&self) -> NodeStats {
        self.stats
    }

    /// Round in which the table first became complete, if it has.
    pub fn completed_at(&self) -> Option<Round> {
        self.completed_at
    }

    /// Human-readable dump of the routing table.
    pub fn dump(&self) -> String {
        format!("{} has routing table: {}", self.id, self.table)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Event handlers
    // ═══════════════════════════════════════════════════════════════════════════

    fn on_start(&mut self) -> Result<Vec<Action>, ProtocolError> {
        if self.phase == NodePhase::Active {
            return Err(ProtocolError::AlreadyStarted { node: self.id });
        }
        self.phase = NodePhase::Active;

        info!(
            node = self.id.0,
            neighbors = ?self.neighbors,
            "Node started, announcing initial table"
        );

        self.note_if_complete();
        Ok(self.broadcast_table())
    }

    fn on_message(&mut self, message: Message) -> Result<Vec<Action>, ProtocolError> {
        if message.destination() != self.id {
            return Err(ProtocolError::Misaddressed {
                node: self.id,
                destination: message.destination(),
            });
        }

        match message {
            Message::TableUpdate(update) => self.on_table_update(update),
            Message::RouteRequest(request) => Ok(self.on_route_request(request)),
            other => Err(ProtocolError::UnsupportedMessage {
                node: self.id,
                type_name: other.type_name(),
            }),
        }
    }

    fn on_table_update(&mut self, update: TableUpdate) -> Result<Vec<Action>, ProtocolError> {
        if !self.neighbors.contains(&update.sender) {
            return Err(ProtocolError::NotANeighbor {
                node: self.id,
                sender: update.sender,
            });
        }
        self.stats.updates_received += 1;

        match merge(&self.table, update.sender, &update.table) {
            MergeOutcome::Changed {
                table,
                destinations,
            } => {
                debug!(
                    node = self.id.0,
                    from = update.sender.0,
                    round = self.round.0,
                    changed = ?destinations,
                    "Merged table update"
                );
                self.table = table;
                self.stats.table_changes += 1;
                self.note_if_complete();

                let mut actions = vec![Action::TableChanged { destinations }];
                actions.extend(self.broadcast_table());
                Ok(actions)
            }
            MergeOutcome::Unchanged => {
                trace!(
                    node = self.id.0,
                    from = update.sender.0,
                    "Table update changed nothing"
                );
                Ok(vec![])
            }
        }
    }

    fn on_route_request(&mut self, request: RouteRequest) -> Vec<Action> {
        match route(self.id, &self.table, request) {
            RouteDecision::Deliver(request) => {
                self.stats.delivered += 1;
                info!(
                    node = self.id.0,
                    origin = request.origin.0,
                    target = request.target.0,
                    payload = %request.payload,
                    "Delivered routed message"
                );
                vec![Action::Deliver(request.into())]
            }
            RouteDecision::Forward(hop) => {
                self.stats.forwarded += 1;
                debug!(
                    node = self.id.0,
                    origin = hop.origin.0,
                    target = hop.target.0,
                    next_hop = hop.destination.0,
                    "Forwarding routed message"
                );
                vec![Action::Send {
                    to: hop.destination,
                    message: hop.into(),
                }]
            }
            RouteDecision::Drop(request) => {
                self.stats.dropped += 1;
                warn!(
                    node = self.id.0,
                    origin = request.origin.0,
                    target = request.target.0,
                    payload = %request.payload,
                    "Dropping routed message: unknown route"
                );
                vec![Action::Drop(DroppedRequest {
                    at: self.id,
                    request,
                })]
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Helpers
    // ═══════════════════════════════════════════════════════════════════════════

    /// One table update per neighbor, each carrying a snapshot of the table.
    fn broadcast_table(&mut self) -> Vec<Action> {
        if self.neighbors.is_empty() {
            return vec![];
        }
        self.stats.broadcasts += 1;

        self.neighbors
            .iter()
            .map(|&neighbor| Action::Send {
                to: neighbor,
                message: TableUpdate::new(self.id, neighbor, self.table.clone()).into(),
            })
            .collect()
    }

    fn note_if_complete(&mut self) {
        if self.completed_at.is_none() && self.is_complete() {
            self.completed_at = Some(self.round);
            info!(
                node = self.id.0,
                round = self.round.0,
                destinations = self.table.destination_count(),
                "Routing table complete"
            );
        }
    }

    fn ensure_active(&self, event: &'static str) -> Result<(), ProtocolError> {
        if self.phase == NodePhase::Init {
            return Err(ProtocolError::NotStarted {
                node: self.id,
                event,
            });
        }
        Ok(())
    }
}

impl StateMachine for NodeStateMachine {
    fn id(&self) -> NodeId {
        self.id
    }

    fn handle(&mut self, event: Event) -> Result<Vec<Action>, ProtocolError> {
        match event {
            Event::Start => self.on_start(),
            Event::MessageReceived(message) => {
                self.ensure_active("MessageReceived")?;
                self.on_message(message)
            }
            Event::RouteRequested { target, payload } => {
                self.ensure_active("RouteRequested")?;
                let request = RouteRequest::originate(self.id, target, payload);
                Ok(self.on_route_request(request))
            }
        }
    }

    fn set_round(&mut self, round: Round) {
        self.round = round;
    }

    fn round(&self) -> Round {
        self.round
    }

    fn is_complete(&self) -> bool {
        is_complete(&self.table, self.topology.node_count())
    }
}

impl std::fmt::Debug for NodeStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeStateMachine")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("round", &self.round)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringrip_core::Delivery;
    use ringrip_test_helpers::{ring, table};
    use tracing_test::traced_test;

    fn make_node(node_count: u32, id: u32) -> NodeStateMachine {
        let mut node = NodeStateMachine::new(NodeId(id), Arc::new(ring(node_count))).unwrap();
        node.handle(Event::Start).unwrap();
        node
    }

    fn sends(actions: &[Action]) -> Vec<(NodeId, &Message)> {
        actions
            .iter()
            .filter_map(|action| match action {
                Action::Send { to, message } => Some((*to, message)),
                _ => None,
            })
            .collect()
    }

    fn route_request(target: u32, payload: &str) -> Message {
        RouteRequest::new(
            NodeId(1),
            NodeId(2),
            NodeId(0),
            NodeId(target),
            payload.to_string(),
        )
        .into()
    }

    #[traced_test]
    #[test]
    fn test_start_broadcasts_initial_table() {
        let mut node = NodeStateMachine::new(NodeId(2), Arc::new(ring(5))).unwrap();
        assert_eq!(node.phase(), NodePhase::Init);

        let actions = node.handle(Event::Start).unwrap();
        let expected = table(2, &[(1, 1, 1), (3, 3, 1)]);

        let sent = sends(&actions);
        assert_eq!(sent.len(), 2);
        for (to, message) in sent {
            let Message::TableUpdate(update) = message else {
                panic!("expected table update");
            };
            assert_eq!(update.destination, to);
            assert_eq!(update.sender, NodeId(2));
            assert_eq!(update.table, expected);
        }
        assert_eq!(node.phase(), NodePhase::Active);
        assert_eq!(node.stats().broadcasts, 1);
    }

    #[traced_test]
    #[test]
    fn test_second_start_is_rejected() {
        let mut node = make_node(5, 0);
        assert_eq!(
            node.handle(Event::Start).unwrap_err(),
            ProtocolError::AlreadyStarted { node: NodeId(0) }
        );
    }

    #[traced_test]
    #[test]
    fn test_message_before_start_is_rejected() {
        let mut node = NodeStateMachine::new(NodeId(2), Arc::new(ring(5))).unwrap();
        let err = node
            .handle(Event::MessageReceived(route_request(2, "Y")))
            .unwrap_err();
        assert!(matches!(err, ProtocolError::NotStarted { .. }));
    }

    #[traced_test]
    #[test]
    fn test_table_update_change_triggers_rebroadcast() {
        let mut node = make_node(5, 2);
        let update = TableUpdate::new(NodeId(1), NodeId(2), table(1, &[(0, 0, 1), (2, 2, 1)]));

        let actions = node
            .handle(Event::MessageReceived(update.into()))
            .unwrap();

        assert!(matches!(
            &actions[0],
            Action::TableChanged { destinations } if destinations == &vec![NodeId(0)]
        ));
        let recipients: Vec<NodeId> = sends(&actions).into_iter().map(|(to, _)| to).collect();
        assert_eq!(recipients, vec![NodeId(1), NodeId(3)]);
        assert_eq!(node.table().distance(NodeId(0)), Some(2));
        assert_eq!(node.table().next_hop(NodeId(0)), Some(NodeId(1)));
        assert_eq!(node.stats().table_changes, 1);
        assert_eq!(node.stats().broadcasts, 2);
    }

    #[traced_test]
    #[test]
    fn test_unchanged_update_is_silent() {
        let mut node = make_node(5, 2);
        let update = TableUpdate::new(NodeId(3), NodeId(2), table(3, &[(2, 2, 1)]));

        let actions = node
            .handle(Event::MessageReceived(update.into()))
            .unwrap();
        assert!(actions.is_empty());
        assert_eq!(node.stats().updates_received, 1);
        assert_eq!(node.stats().broadcasts, 1);
    }

    #[traced_test]
    #[test]
    fn test_update_from_non_neighbor_fails() {
        let mut node = make_node(5, 2);
        let update = TableUpdate::new(NodeId(4), NodeId(2), table(4, &[]));

        assert_eq!(
            node.handle(Event::MessageReceived(update.into()))
                .unwrap_err(),
            ProtocolError::NotANeighbor {
                node: NodeId(2),
                sender: NodeId(4)
            }
        );
    }

    #[traced_test]
    #[test]
    fn test_misaddressed_message_fails() {
        let mut node = make_node(5, 3);
        let err = node
            .handle(Event::MessageReceived(route_request(4, "X")))
            .unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Misaddressed {
                node: NodeId(3),
                destination: NodeId(2)
            }
        );
    }

    #[traced_test]
    #[test]
    fn test_route_request_forwarded_to_next_hop() {
        let mut node = make_node(5, 2);
        // Teach node 2 that node 4 is two hops away through node 3.
        let update = TableUpdate::new(NodeId(3), NodeId(2), table(3, &[(4, 4, 1), (2, 2, 1)]));
        node.handle(Event::MessageReceived(update.into())).unwrap();
        assert_eq!(node.table().next_hop(NodeId(4)), Some(NodeId(3)));
        assert_eq!(node.table().distance(NodeId(4)), Some(2));

        let actions = node
            .handle(Event::MessageReceived(route_request(4, "X")))
            .unwrap();

        assert_eq!(actions.len(), 1);
        let Action::Send { to, message } = &actions[0] else {
            panic!("expected a send");
        };
        assert_eq!(*to, NodeId(3));
        assert_eq!(
            message,
            &Message::RouteRequest(RouteRequest::new(
                NodeId(2),
                NodeId(3),
                NodeId(0),
                NodeId(4),
                "X".to_string()
            ))
        );
        assert_eq!(node.stats().forwarded, 1);
    }

    #[traced_test]
    #[test]
    fn test_route_request_delivered_at_target() {
        let mut node = make_node(5, 2);

        let actions = node
            .handle(Event::MessageReceived(route_request(2, "Y")))
            .unwrap();

        assert_eq!(actions.len(), 1);
        assert!(matches!(
            &actions[0],
            Action::Deliver(Delivery { origin, target, payload })
                if *origin == NodeId(0) && *target == NodeId(2) && payload == "Y"
        ));
        assert!(!actions.iter().any(Action::is_send));
        assert_eq!(node.stats().delivered, 1);
    }

    #[traced_test]
    #[test]
    fn test_route_request_dropped_without_route() {
        let mut node = make_node(5, 2);

        let actions = node
            .handle(Event::MessageReceived(route_request(0, "Z")))
            .unwrap();

        assert_eq!(actions.len(), 1);
        let Action::Drop(dropped) = &actions[0] else {
            panic!("expected a drop");
        };
        assert_eq!(dropped.at, NodeId(2));
        assert_eq!(dropped.request.target, NodeId(0));
        assert_eq!(node.stats().dropped, 1);
        assert!(logs_contain("Dropping routed message"));
    }

    #[traced_test]
    #[test]
    fn test_originate_request() {
        let mut node = make_node(5, 2);

        let actions = node
            .handle(Event::RouteRequested {
                target: NodeId(3),
                payload: "hello".to_string(),
            })
            .unwrap();

        let sent = sends(&actions);
        assert_eq!(sent.len(), 1);
        let (to, Message::RouteRequest(request)) = sent[0] else {
            panic!("expected a route request");
        };
        assert_eq!(to, NodeId(3));
        assert_eq!(request.origin, NodeId(2));
        assert_eq!(request.sender, NodeId(2));

        // Originating to self delivers immediately.
        let actions = node
            .handle(Event::RouteRequested {
                target: NodeId(2),
                payload: "loopback".to_string(),
            })
            .unwrap();
        assert!(matches!(&actions[0], Action::Deliver(_)));
    }

    #[traced_test]
    #[test]
    fn test_completion_is_recorded_once() {
        let mut node = make_node(5, 0);
        assert!(!node.is_complete());
        assert_eq!(node.completed_at(), None);

        node.set_round(Round(3));
        let from_one = TableUpdate::new(NodeId(1), NodeId(0), table(1, &[(2, 2, 1), (0, 0, 1)]));
        node.handle(Event::MessageReceived(from_one.into())).unwrap();
        assert!(!node.is_complete());

        node.set_round(Round(4));
        let from_four = TableUpdate::new(NodeId(4), NodeId(0), table(4, &[(3, 3, 1), (0, 0, 1)]));
        node.handle(Event::MessageReceived(from_four.into())).unwrap();

        assert!(node.is_complete());
        assert_eq!(node.completed_at(), Some(Round(4)));
        assert!(logs_contain("Routing table complete"));
    }

    #[test]
    fn test_unknown_node_rejected() {
        let err = NodeStateMachine::new(NodeId(5), Arc::new(ring(5))).unwrap_err();
        assert_eq!(
            err,
            TopologyError::UnknownNode {
                node: NodeId(5),
                node_count: 5
            }
        );
    }

    #[test]
    fn test_dump() {
        let node = make_node(3, 1);
        assert_eq!(
            node.dump(),
            "Node(1) has routing table: {0: (0, 1), 1: (1, 0), 2: (2, 1)}"
        );
    }
}
