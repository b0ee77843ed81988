//! Simulation runner.

use crate::{NetworkConfig, SimulatedNetwork, SimulationError};
use rayon::prelude::*;
use ringrip_core::{
    Action, DeliveryRecord, DropRecord, Event, ProtocolError, RouteOrder, StateMachine,
};
use ringrip_messages::Message;
use ringrip_node::NodeStateMachine;
use ringrip_types::{NodeId, RingTopology, Round, RoutingTable, Topology};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, trace};

/// Statistics collected over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    /// Rounds completed after the Init round.
    pub rounds: u64,
    /// Messages handed to the network.
    pub messages_sent: u64,
    /// Of which table updates.
    pub table_updates_sent: u64,
    /// Of which route request hops.
    pub route_requests_sent: u64,
    /// Node-rounds in which a node had nothing to receive.
    pub idle_node_rounds: u64,
    /// Table changes across all nodes.
    pub table_changes: u64,
    /// Delivered payloads, in order.
    pub deliveries: Vec<DeliveryRecord>,
    /// Dropped requests, in order.
    pub drops: Vec<DropRecord>,
    /// First round at which every node's table was complete.
    pub converged_at: Option<Round>,
}

/// Runs a ring of routing nodes over the simulated network.
///
/// Each round, every node receives at most one message and handles it. Node
/// handling runs in parallel; actions are applied in node id order so that a
/// run is reproducible.
///
/// A node rejecting its message fails the whole run: the failing round's
/// actions are discarded and every later call returns
/// [`SimulationError::Lifecycle`].
pub struct SimulationRunner {
    config: NetworkConfig,
    topology: Arc<RingTopology>,
    nodes: Vec<NodeStateMachine>,
    network: SimulatedNetwork,
    stats: SimulationStats,
    started: bool,
    failed: bool,
}

impl SimulationRunner {
    /// Build the ring and its nodes. Nothing is sent until [`start`](Self::start).
    pub fn new(config: NetworkConfig) -> Result<Self, SimulationError> {
        let topology = Arc::new(RingTopology::new(config.node_count)?);
        let nodes = topology
            .nodes()
            .map(|id| NodeStateMachine::new(id, topology.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        let network = SimulatedNetwork::new(config.node_count);

        Ok(Self {
            config,
            topology,
            nodes,
            network,
            stats: SimulationStats::default(),
            started: false,
            failed: false,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════════

    /// Get the configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Get the topology.
    pub fn topology(&self) -> &RingTopology {
        &self.topology
    }

    /// Get all nodes, indexed by id.
    pub fn nodes(&self) -> &[NodeStateMachine] {
        &self.nodes
    }

    /// Get a node.
    pub fn node(&self, id: NodeId) -> Option<&NodeStateMachine> {
        self.nodes.get(id.index())
    }

    /// Snapshot of every node's table, indexed by id.
    pub fn tables(&self) -> Vec<RoutingTable> {
        self.nodes.iter().map(|node| node.table().clone()).collect()
    }

    /// Get collected statistics.
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Current round.
    pub fn round(&self) -> Round {
        self.network.round()
    }

    /// Every node considers its table complete.
    pub fn is_converged(&self) -> bool {
        self.nodes.iter().all(StateMachine::is_complete)
    }

    /// No message is waiting anywhere; further rounds change nothing.
    pub fn is_quiescent(&self) -> bool {
        self.network.in_flight() == 0
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Driving the simulation
    // ═══════════════════════════════════════════════════════════════════════════

    /// Run every node's Init step in round zero and cross the first barrier.
    pub fn start(&mut self) -> Result<(), SimulationError> {
        if self.failed {
            return Err(SimulationError::Lifecycle("failed"));
        }
        if self.started {
            return Err(SimulationError::Lifecycle("already started"));
        }
        self.started = true;

        info!(nodes = self.config.node_count, "Starting ring simulation");

        let round = self.network.round();
        for index in 0..self.nodes.len() {
            let node = &mut self.nodes[index];
            node.set_round(round);
            let id = node.id();
            let actions = node.handle(Event::Start)?;
            self.apply_actions(id, round, actions)?;
        }

        self.finish_round(round);
        Ok(())
    }

    /// Run one round: each node receives and handles at most one message.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        self.ensure_running()?;
        let round = self.network.round();

        let inbound: Vec<Option<Message>> = (0..self.config.node_count)
            .map(|id| self.network.receive(NodeId(id)))
            .collect();

        let results: Vec<(NodeId, bool, Result<Vec<Action>, ProtocolError>)> = self
            .nodes
            .par_iter_mut()
            .zip(inbound.into_par_iter())
            .map(|(node, message)| {
                node.set_round(round);
                let id = node.id();
                match message {
                    Some(message) => (id, false, node.handle(Event::MessageReceived(message))),
                    None => (id, true, Ok(vec![])),
                }
            })
            .collect();

        let mut batches = Vec::with_capacity(results.len());
        for (id, idle, result) in results {
            match result {
                Ok(actions) => batches.push((id, idle, actions)),
                Err(err) => {
                    error!(node = id.0, round = round.0, error = %err, "Node rejected message");
                    self.failed = true;
                    return Err(err.into());
                }
            }
        }

        for (id, idle, actions) in batches {
            if idle {
                self.stats.idle_node_rounds += 1;
            }
            self.apply_actions(id, round, actions)?;
        }

        self.stats.rounds += 1;
        self.finish_round(round);
        Ok(())
    }

    /// Ask `origin` to route `payload` to `target`.
    ///
    /// The origin handles the request immediately; the first hop, if any,
    /// travels in the next round.
    pub fn inject_request(
        &mut self,
        origin: NodeId,
        target: NodeId,
        payload: impl Into<String>,
    ) -> Result<(), SimulationError> {
        self.ensure_running()?;
        self.topology.check(origin)?;
        self.topology.check(target)?;

        let round = self.network.round();
        let node = &mut self.nodes[origin.index()];
        node.set_round(round);
        let actions = node.handle(Event::RouteRequested {
            target,
            payload: payload.into(),
        })?;
        self.apply_actions(origin, round, actions)
    }

    /// Hand a prepared [`RouteOrder`] to its origin.
    pub fn inject(&mut self, order: RouteOrder) -> Result<(), SimulationError> {
        let RouteOrder {
            origin,
            target,
            payload,
        } = order;
        self.inject_request(origin, target, payload)
    }

    /// Run exactly `rounds` rounds.
    pub fn run_rounds(&mut self, rounds: u64) -> Result<(), SimulationError> {
        for _ in 0..rounds {
            self.step()?;
        }
        Ok(())
    }

    /// Run until every node's table is complete. Returns the round reached.
    pub fn run_until_converged(&mut self) -> Result<Round, SimulationError> {
        self.run_until("convergence", Self::is_converged)
    }

    /// Run until no message is left in the network. Returns the round reached.
    pub fn run_until_quiescent(&mut self) -> Result<Round, SimulationError> {
        self.run_until("quiescence", Self::is_quiescent)
    }

    fn run_until(
        &mut self,
        goal: &'static str,
        done: impl Fn(&Self) -> bool,
    ) -> Result<Round, SimulationError> {
        if !self.started {
            self.start()?;
        }
        while !done(self) {
            if self.network.round().0 >= self.config.max_rounds {
                return Err(SimulationError::RoundBudgetExhausted {
                    max_rounds: self.config.max_rounds,
                    goal,
                });
            }
            self.step()?;
        }
        debug!(goal, round = self.network.round().0, "Simulation goal reached");
        Ok(self.network.round())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Internals
    // ═══════════════════════════════════════════════════════════════════════════

    fn ensure_running(&self) -> Result<(), SimulationError> {
        if self.failed {
            return Err(SimulationError::Lifecycle("failed"));
        }
        if !self.started {
            return Err(SimulationError::Lifecycle("not started"));
        }
        Ok(())
    }

    fn apply_actions(
        &mut self,
        from: NodeId,
        round: Round,
        actions: Vec<Action>,
    ) -> Result<(), SimulationError> {
        for action in actions {
            match action {
                Action::Send { to, message } => {
                    trace!(from = from.0, to = to.0, kind = message.type_name(), "Send");
                    self.stats.messages_sent += 1;
                    if message.is_table_update() {
                        self.stats.table_updates_sent += 1;
                    } else if message.is_route_request() {
                        self.stats.route_requests_sent += 1;
                    }
                    self.network.send(from, to, message)?;
                }
                Action::Deliver(delivery) => {
                    self.stats.deliveries.push(DeliveryRecord { round, delivery });
                }
                Action::Drop(dropped) => {
                    self.stats.drops.push(DropRecord { round, dropped });
                }
                Action::TableChanged { .. } => {
                    self.stats.table_changes += 1;
                }
            }
        }
        Ok(())
    }

    fn finish_round(&mut self, round: Round) {
        if self.stats.converged_at.is_none() && self.is_converged() {
            self.stats.converged_at = Some(round);
            info!(
                round = round.0,
                messages = self.stats.messages_sent,
                "All routing tables complete"
            );
        }
        self.network.advance_round();
    }
}
