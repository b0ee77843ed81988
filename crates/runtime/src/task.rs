//! The loop each node task runs.

use crate::channels::{NodeChannels, NodeStatus};
use crate::{RoundScheduler, RuntimeError};
use ringrip_core::{Action, DeliveryRecord, DropRecord, Event, StateMachine};
use ringrip_node::NodeStateMachine;
use ringrip_types::Round;
use std::sync::Arc;
use tracing::{error, trace};

/// What a node task hands back when the run halts.
#[derive(Debug)]
pub struct NodeOutcome {
    /// The node with its final table.
    pub node: NodeStateMachine,
    /// Payloads delivered at this node.
    pub deliveries: Vec<DeliveryRecord>,
    /// Requests dropped at this node.
    pub drops: Vec<DropRecord>,
}

struct NodeTask {
    node: NodeStateMachine,
    channels: NodeChannels,
    round: Round,
    received: u64,
    sent: u64,
    failure: Option<RuntimeError>,
    deliveries: Vec<DeliveryRecord>,
    drops: Vec<DropRecord>,
}

impl NodeTask {
    /// Round zero runs Init; every later round hands over pending orders and
    /// then at most one inbound message.
    fn process(&mut self) -> Result<(), RuntimeError> {
        self.node.set_round(self.round);

        if self.round == Round::ZERO {
            let actions = self.node.handle(Event::Start)?;
            self.apply(actions);
            return Ok(());
        }

        while let Ok(order) = self.channels.orders.try_recv() {
            let actions = self.node.handle(order.into_event())?;
            self.apply(actions);
        }

        if let Ok(message) = self.channels.inbound.try_recv() {
            self.received += 1;
            let actions = self.node.handle(Event::MessageReceived(message))?;
            self.apply(actions);
        }
        Ok(())
    }

    fn apply(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Send { to, message } => self.channels.outbox.stage(to, message),
                Action::Deliver(delivery) => self.deliveries.push(DeliveryRecord {
                    round: self.round,
                    delivery,
                }),
                Action::Drop(dropped) => self.drops.push(DropRecord {
                    round: self.round,
                    dropped,
                }),
                Action::TableChanged { destinations } => {
                    trace!(node = self.node.id().0, ?destinations, "Table changed");
                }
            }
        }
    }

    fn fail(&mut self, err: RuntimeError) {
        error!(
            node = self.node.id().0,
            round = self.round.0,
            error = %err,
            "Node failed, idling until halt"
        );
        self.failure = Some(err);
    }

    fn publish(&self) {
        self.channels.status.send_replace(NodeStatus {
            round: self.round,
            complete: self.node.is_complete(),
            received: self.received,
            sent: self.sent,
            failure: self.failure.clone(),
        });
    }
}

/// Run one node until the coordinator halts the scheduler.
///
/// A failing node keeps crossing barriers without processing, so the other
/// tasks never wait on it; the failure reaches the coordinator through the
/// node's status.
pub async fn run_node(
    node: NodeStateMachine,
    channels: NodeChannels,
    scheduler: Arc<RoundScheduler>,
) -> NodeOutcome {
    let mut task = NodeTask {
        node,
        channels,
        round: Round::ZERO,
        received: 0,
        sent: 0,
        failure: None,
        deliveries: Vec::new(),
        drops: Vec::new(),
    };

    while scheduler.begin_round().await {
        if task.failure.is_none() {
            if let Err(err) = task.process() {
                task.fail(err);
            }
        }
        scheduler.end_processing().await;

        if task.failure.is_none() {
            match task.channels.outbox.flush() {
                Ok(sent) => task.sent += sent,
                Err(err) => task.fail(err),
            }
        }
        task.publish();
        scheduler.end_flush().await;

        task.round = task.round.next();
    }

    NodeOutcome {
        node: task.node,
        deliveries: task.deliveries,
        drops: task.drops,
    }
}
