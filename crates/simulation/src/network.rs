//! Simulated round-synchronous network.

use crate::{Mailbox, SimulationError};
use ringrip_messages::Message;
use ringrip_types::{NodeId, Round};

/// Configuration for a simulated network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Number of nodes on the ring.
    pub node_count: u32,

    /// Rounds a `run_until_*` call may use before giving up.
    pub max_rounds: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            node_count: 5,
            max_rounds: 1_000,
        }
    }
}

impl NetworkConfig {
    /// Create a config for a ring of `node_count` nodes.
    pub fn new(node_count: u32) -> Self {
        Self {
            node_count,
            ..Default::default()
        }
    }

    /// Set the round budget.
    pub fn with_max_rounds(mut self, max_rounds: u64) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}

/// One mailbox per node plus the global round counter.
///
/// The network itself never inspects message contents; it only enforces the
/// round barrier.
#[derive(Debug)]
pub struct SimulatedNetwork {
    mailboxes: Vec<Mailbox>,
    round: Round,
}

impl SimulatedNetwork {
    /// Create a network for `node_count` nodes at round zero.
    pub fn new(node_count: u32) -> Self {
        Self {
            mailboxes: (0..node_count).map(|_| Mailbox::new()).collect(),
            round: Round::ZERO,
        }
    }

    /// Current round.
    pub fn round(&self) -> Round {
        self.round
    }

    /// Fire-and-forget send; `to` sees the message in a later round.
    pub fn send(
        &mut self,
        from: NodeId,
        to: NodeId,
        message: Message,
    ) -> Result<(), SimulationError> {
        let mailbox = self
            .mailboxes
            .get_mut(to.index())
            .ok_or(SimulationError::UnknownRecipient { from, to })?;
        mailbox.stage(message);
        Ok(())
    }

    /// This round's message for `node`, if any.
    pub fn receive(&mut self, node: NodeId) -> Option<Message> {
        self.mailboxes.get_mut(node.index())?.receive()
    }

    /// Advance the global round: every staged message becomes receivable.
    pub fn advance_round(&mut self) {
        for mailbox in &mut self.mailboxes {
            mailbox.advance();
        }
        self.round = self.round.next();
    }

    /// Messages not yet received, across all nodes.
    pub fn in_flight(&self) -> usize {
        self.mailboxes.iter().map(Mailbox::pending).sum()
    }
}
