//! Per-node channel pairs.
//!
//! Every node owns its inbound receiver and an [`Outbox`] holding senders to
//! all inbound channels. Sends are staged during processing and only flushed
//! after the processing barrier, so nothing sent in a round can be received
//! in the same round.

use crate::RuntimeError;
use ringrip_core::RouteOrder;
use ringrip_messages::Message;
use ringrip_types::{NodeId, Round};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// What a node reports to the coordinator after each round.
#[derive(Debug, Clone, Default)]
pub struct NodeStatus {
    /// Last round the node finished.
    pub round: Round,
    /// The node's table is complete.
    pub complete: bool,
    /// Messages taken from the inbound channel so far.
    pub received: u64,
    /// Messages flushed to other nodes so far.
    pub sent: u64,
    /// Set once the node hit an error; it idles afterwards.
    pub failure: Option<RuntimeError>,
}

/// Outbound half of a node's channel pair.
#[derive(Debug)]
pub struct Outbox {
    from: NodeId,
    peers: Arc<[mpsc::UnboundedSender<Message>]>,
    staged: Vec<(NodeId, Message)>,
}

impl Outbox {
    fn new(from: NodeId, peers: Arc<[mpsc::UnboundedSender<Message>]>) -> Self {
        Self {
            from,
            peers,
            staged: Vec::new(),
        }
    }

    /// Hold a message until the next flush.
    pub fn stage(&mut self, to: NodeId, message: Message) {
        self.staged.push((to, message));
    }

    /// Number of staged messages.
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Push every staged message into its recipient's inbound channel, in
    /// staging order. Returns how many were sent.
    pub fn flush(&mut self) -> Result<u64, RuntimeError> {
        let mut sent = 0;
        for (to, message) in self.staged.drain(..) {
            let peer = self.peers.get(to.index()).ok_or(RuntimeError::UnknownRecipient {
                from: self.from,
                to,
            })?;
            peer.send(message).map_err(|_| RuntimeError::ChannelClosed(to))?;
            sent += 1;
        }
        Ok(sent)
    }
}

/// Everything a node task owns.
#[derive(Debug)]
pub struct NodeChannels {
    /// Messages from neighbors.
    pub inbound: mpsc::UnboundedReceiver<Message>,
    /// Route requests the application asks this node to originate.
    pub orders: mpsc::UnboundedReceiver<RouteOrder>,
    /// Sends staged this round.
    pub outbox: Outbox,
    /// Where to publish the end-of-round status.
    pub status: watch::Sender<NodeStatus>,
}

/// The coordinator's handle on one node.
#[derive(Debug)]
pub struct NodeControl {
    /// Hands route requests to the node.
    pub orders: mpsc::UnboundedSender<RouteOrder>,
    /// Latest end-of-round status.
    pub status: watch::Receiver<NodeStatus>,
}

/// Build the channel pairs for a ring of `node_count` nodes, indexed by id.
pub fn wire(node_count: u32) -> (Vec<NodeChannels>, Vec<NodeControl>) {
    let (senders, receivers): (Vec<_>, Vec<_>) =
        (0..node_count).map(|_| mpsc::unbounded_channel::<Message>()).unzip();
    let peers: Arc<[mpsc::UnboundedSender<Message>]> = Arc::from(senders);

    receivers
        .into_iter()
        .enumerate()
        .map(|(index, inbound)| {
            let (order_tx, order_rx) = mpsc::unbounded_channel();
            let (status_tx, status_rx) = watch::channel(NodeStatus::default());
            let channels = NodeChannels {
                inbound,
                orders: order_rx,
                outbox: Outbox::new(NodeId(index as u32), peers.clone()),
                status: status_tx,
            };
            let control = NodeControl {
                orders: order_tx,
                status: status_rx,
            };
            (channels, control)
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringrip_messages::TableUpdate;
    use ringrip_types::RoutingTable;

    fn update(from: u32, to: u32) -> Message {
        TableUpdate::new(NodeId(from), NodeId(to), RoutingTable::new(NodeId(from))).into()
    }

    #[test]
    fn test_staged_messages_are_invisible_until_flush() {
        let (mut channels, _controls) = wire(3);

        channels[0].outbox.stage(NodeId(1), update(0, 1));
        assert_eq!(channels[0].outbox.len(), 1);
        assert!(channels[1].inbound.try_recv().is_err());

        assert_eq!(channels[0].outbox.flush(), Ok(1));
        assert!(channels[0].outbox.is_empty());
        let received = channels[1].inbound.try_recv().unwrap();
        assert_eq!(received.sender(), NodeId(0));
    }

    #[test]
    fn test_flush_to_unknown_node_fails() {
        let (mut channels, _controls) = wire(2);
        channels[0].outbox.stage(NodeId(5), update(0, 5));

        assert_eq!(
            channels[0].outbox.flush(),
            Err(RuntimeError::UnknownRecipient {
                from: NodeId(0),
                to: NodeId(5)
            })
        );
    }

    #[test]
    fn test_flush_preserves_order() {
        let (mut channels, _controls) = wire(3);
        channels[0].outbox.stage(NodeId(2), update(0, 2));
        channels[1].outbox.stage(NodeId(2), update(1, 2));
        channels[0].outbox.flush().unwrap();
        channels[1].outbox.flush().unwrap();

        assert_eq!(channels[2].inbound.try_recv().unwrap().sender(), NodeId(0));
        assert_eq!(channels[2].inbound.try_recv().unwrap().sender(), NodeId(1));
    }
}
