//! Runtime errors.

use ringrip_core::ProtocolError;
use ringrip_types::{NodeId, TopologyError};
use thiserror::Error;

/// Errors that stop a runtime run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The ring could not be built.
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

    /// A recipient's inbound channel was gone while the run was live.
    #[error("inbound channel of {0} closed")]
    ChannelClosed(NodeId),

    /// A node task panicked or was aborted.
    #[error("task of {node} failed: {reason}")]
    TaskFailed {
        /// Node whose task failed.
        node: NodeId,
        /// Join error text.
        reason: String,
    },

    /// A task the coordinator has no record of failed.
    #[error("unknown task failed: {0}")]
    UnknownTask(String),

    /// The round budget ran out before the run went quiet.
    #[error("round budget of {max_rounds} exhausted")]
    RoundBudgetExhausted {
        /// Configured budget.
        max_rounds: u64,
    },
}
