//! Protocol errors.

use ringrip_types::NodeId;
use thiserror::Error;

/// Integration errors surfaced by a node state machine.
///
/// None of these are expected during a correct run: message loss for lack of
/// a route is an [`Action::Drop`](crate::Action::Drop), not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The node received a message kind it does not know how to handle.
    #[error("{node} received unsupported message kind {type_name}")]
    UnsupportedMessage {
        /// Receiving node.
        node: NodeId,
        /// Name of the message kind.
        type_name: &'static str,
    },

    /// The substrate delivered a message addressed to another node.
    #[error("{node} received a message addressed to {destination}")]
    Misaddressed {
        /// Receiving node.
        node: NodeId,
        /// Destination recorded in the message.
        destination: NodeId,
    },

    /// A table update claimed to come from a node that is not a neighbor.
    #[error("{node} received a table update from non-neighbor {sender}")]
    NotANeighbor {
        /// Receiving node.
        node: NodeId,
        /// Claimed sender.
        sender: NodeId,
    },

    /// `Start` was delivered twice.
    #[error("{node} was already started")]
    AlreadyStarted {
        /// The node.
        node: NodeId,
    },

    /// An event other than `Start` arrived before the Init step ran.
    #[error("{node} received {event} before it was started")]
    NotStarted {
        /// The node.
        node: NodeId,
        /// Name of the offending event.
        event: &'static str,
    },
}
