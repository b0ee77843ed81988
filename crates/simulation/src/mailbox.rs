//! Per-node inbound queue with a round barrier.

use ringrip_messages::Message;
use std::collections::VecDeque;

/// Inbound messages for one node.
///
/// Messages sent during a round are staged and only become receivable after
/// [`Mailbox::advance`]. A node can take at most one message per round;
/// anything else stays queued, in arrival order, for later rounds.
#[derive(Debug, Default)]
pub struct Mailbox {
    /// Receivable messages, oldest first.
    ready: VecDeque<Message>,
    /// Messages sent this round, invisible until the barrier.
    staged: Vec<Message>,
    /// Whether the node already took its message this round.
    taken_this_round: bool,
}

impl Mailbox {
    /// Create an empty mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a message for delivery in a later round.
    pub fn stage(&mut self, message: Message) {
        self.staged.push(message);
    }

    /// Take this round's message, if any.
    ///
    /// Returns `None` once a message has been taken this round, even if more
    /// are queued.
    pub fn receive(&mut self) -> Option<Message> {
        if self.taken_this_round {
            return None;
        }
        let message = self.ready.pop_front()?;
        self.taken_this_round = true;
        Some(message)
    }

    /// Round barrier: staged messages become receivable.
    pub fn advance(&mut self) {
        self.ready.extend(self.staged.drain(..));
        self.taken_this_round = false;
    }

    /// Messages waiting to be received, staged ones included.
    pub fn pending(&self) -> usize {
        self.ready.len() + self.staged.len()
    }

    /// Check if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringrip_messages::RouteRequest;
    use ringrip_types::NodeId;

    fn message(payload: &str) -> Message {
        RouteRequest::originate(NodeId(0), NodeId(1), payload.to_string()).into()
    }

    fn payload(message: Message) -> String {
        match message {
            Message::RouteRequest(request) => request.payload,
            other => panic!("unexpected {}", other.type_name()),
        }
    }

    #[test]
    fn test_staged_messages_invisible_until_barrier() {
        let mut mailbox = Mailbox::new();
        mailbox.stage(message("a"));

        assert!(mailbox.receive().is_none());
        assert_eq!(mailbox.pending(), 1);

        mailbox.advance();
        assert_eq!(payload(mailbox.receive().unwrap()), "a");
        assert!(mailbox.is_empty());
    }

    #[test]
    fn test_one_message_per_round_in_order() {
        let mut mailbox = Mailbox::new();
        mailbox.stage(message("a"));
        mailbox.stage(message("b"));
        mailbox.advance();

        assert_eq!(payload(mailbox.receive().unwrap()), "a");
        assert!(mailbox.receive().is_none(), "second receive in same round");

        // A message staged now queues behind the leftover one.
        mailbox.stage(message("c"));
        mailbox.advance();
        assert_eq!(payload(mailbox.receive().unwrap()), "b");

        mailbox.advance();
        assert_eq!(payload(mailbox.receive().unwrap()), "c");
    }

    #[test]
    fn test_idle_round_does_not_block_next() {
        let mut mailbox = Mailbox::new();
        assert!(mailbox.receive().is_none());
        mailbox.stage(message("a"));
        mailbox.advance();
        assert!(mailbox.receive().is_some());
    }
}
