//! Round barrier shared by the coordinator and every node task.

use tokio::sync::Barrier;
use tokio_util::sync::CancellationToken;

/// Drives node tasks through rounds.
///
/// Each round has three barrier crossings, all with N node tasks plus the
/// coordinator:
///
/// 1. [`begin_round`](Self::begin_round): the coordinator has decided whether
///    to continue; nodes then receive and process.
/// 2. [`end_processing`](Self::end_processing): every receive is done; nodes
///    flush their outboxes.
/// 3. [`end_flush`](Self::end_flush): every send is in its recipient's
///    inbound channel and every status is published.
///
/// The halt flag is only ever set by the coordinator before crossing 1, so
/// every node observes the same decision for a round.
#[derive(Debug)]
pub struct RoundScheduler {
    barrier: Barrier,
    halt: CancellationToken,
}

impl RoundScheduler {
    /// Scheduler for `node_count` node tasks and one coordinator.
    pub fn new(node_count: u32) -> Self {
        Self {
            barrier: Barrier::new(node_count as usize + 1),
            halt: CancellationToken::new(),
        }
    }

    /// Cross into the next round. False once the run is halted.
    pub async fn begin_round(&self) -> bool {
        self.barrier.wait().await;
        !self.halt.is_cancelled()
    }

    /// Every node has finished receiving and processing.
    pub async fn end_processing(&self) {
        self.barrier.wait().await;
    }

    /// Every staged send has been flushed.
    pub async fn end_flush(&self) {
        self.barrier.wait().await;
    }

    /// Stop the run at the next [`begin_round`](Self::begin_round).
    pub fn halt(&self) {
        self.halt.cancel();
    }

    /// Whether the run has been halted.
    pub fn is_halted(&self) -> bool {
        self.halt.is_cancelled()
    }
}
