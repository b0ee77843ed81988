//! Simulation errors.

use ringrip_core::ProtocolError;
use ringrip_types::{NodeId, TopologyError};
use thiserror::Error;

/// Errors that stop a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// The network could not be built.
    #[error("invalid topology: {0}")]
    Topology(#[from] TopologyError),

    /// A node reported an integration error.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A node tried to send to a node that does not exist.
    #[error("{from} sent a message to unknown {to}")]
    UnknownRecipient {
        /// Sending node.
        from: NodeId,
        /// Requested recipient.
        to: NodeId,
    },

    /// `start()` was called twice, a round was run before it, or an earlier
    /// round already failed.
    #[error("simulation {0}")]
    Lifecycle(&'static str),

    /// The configured round budget ran out before the goal was reached.
    #[error("round budget of {max_rounds} exhausted while waiting for {goal}")]
    RoundBudgetExhausted {
        /// Configured budget.
        max_rounds: u64,
        /// What the run was waiting for.
        goal: &'static str,
    },
}
