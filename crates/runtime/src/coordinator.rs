//! Coordinator: spawns node tasks, drives rounds, decides when to halt.

use crate::channels::{wire, NodeControl, NodeStatus};
use crate::task::{run_node, NodeOutcome};
use crate::{InjectAt, RoundScheduler, RuntimeConfig, RuntimeError};
use ringrip_core::{DeliveryRecord, DropRecord, RouteOrder, StateMachine};
use ringrip_node::{NodeStateMachine, NodeStats};
use ringrip_routing::is_complete;
use ringrip_types::{NodeId, RingTopology, Round, RoutingTable, Topology};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::task::{self, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every order was handed out and no message is left in flight.
    Quiescent,
    /// The caller's cancellation token fired.
    Cancelled,
}

/// Outcome of a runtime run.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeReport {
    /// Why the run stopped.
    pub stop: StopReason,
    /// Rounds run, Init included.
    pub rounds: u64,
    /// Round in which every table was first complete.
    pub converged_at: Option<Round>,
    /// Messages flushed across all nodes.
    pub messages_sent: u64,
    /// Final tables, indexed by node id.
    pub tables: Vec<RoutingTable>,
    /// Per-node counters, indexed by node id.
    pub node_stats: Vec<NodeStats>,
    /// Diagnostic dump of every node's table.
    pub dumps: Vec<String>,
    /// Deliveries ordered by round, then target.
    pub deliveries: Vec<DeliveryRecord>,
    /// Drops ordered by round, then node.
    pub drops: Vec<DropRecord>,
}

#[derive(Debug, Default)]
struct Progress {
    rounds: u64,
    converged_at: Option<Round>,
    messages_sent: u64,
}

/// The running node tasks.
///
/// A task that ends before the halt never reaches the barrier again, so every
/// barrier crossing of the coordinator is raced against the tasks finishing.
#[derive(Default)]
struct NodeTasks {
    set: JoinSet<NodeOutcome>,
    nodes: HashMap<task::Id, NodeId>,
}

impl NodeTasks {
    fn spawn<F>(&mut self, node: NodeId, future: F)
    where
        F: Future<Output = NodeOutcome> + Send + 'static,
    {
        let handle = self.set.spawn(future);
        self.nodes.insert(handle.id(), node);
    }

    /// Wait for a barrier crossing, failing if any task ends first.
    ///
    /// The crossing is polled first: once the barrier has released, tasks
    /// leaving it after the halt are not early exits.
    async fn cross<T>(&mut self, crossing: impl Future<Output = T>) -> Result<T, RuntimeError> {
        let joined = tokio::select! {
            biased;
            crossed = crossing => return Ok(crossed),
            Some(joined) = self.set.join_next() => joined,
        };
        let failure = self.early_exit(joined);
        error!(error = %failure, "Node task ended before the halt");
        Err(failure)
    }

    fn early_exit(&self, joined: Result<NodeOutcome, JoinError>) -> RuntimeError {
        match joined {
            Ok(outcome) => RuntimeError::TaskFailed {
                node: outcome.node.id(),
                reason: "exited before the halt".into(),
            },
            Err(err) => self.join_failure(err),
        }
    }

    fn join_failure(&self, err: JoinError) -> RuntimeError {
        match self.nodes.get(&err.id()) {
            Some(node) => RuntimeError::TaskFailed {
                node: *node,
                reason: err.to_string(),
            },
            None => RuntimeError::UnknownTask(err.to_string()),
        }
    }

    /// Collect every outcome after the halt, ordered by node id.
    async fn join_all(mut self) -> Result<Vec<NodeOutcome>, RuntimeError> {
        let mut outcomes = Vec::with_capacity(self.nodes.len());
        while let Some(joined) = self.set.join_next().await {
            outcomes.push(joined.map_err(|err| self.join_failure(err))?);
        }
        outcomes.sort_by_key(|outcome| outcome.node.id());
        Ok(outcomes)
    }
}

/// Run a ring of `config.node_count` tasks until the run goes quiet, the
/// round budget runs out, or `cancel` fires.
///
/// Route requests in the config are handed out once, either right after Init
/// or once every table is complete.
pub async fn run(
    config: RuntimeConfig,
    cancel: CancellationToken,
) -> Result<RuntimeReport, RuntimeError> {
    let topology = Arc::new(RingTopology::new(config.node_count)?);
    for order in &config.requests {
        topology.check(order.origin)?;
        topology.check(order.target)?;
    }
    let nodes = topology
        .nodes()
        .map(|id| NodeStateMachine::new(id, topology.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        nodes = config.node_count,
        requests = config.requests.len(),
        inject_at = ?config.inject_at,
        "Starting ring runtime"
    );

    let (channels, controls) = wire(config.node_count);
    let scheduler = Arc::new(RoundScheduler::new(config.node_count));
    let mut tasks = NodeTasks::default();
    for (node, channels) in nodes.into_iter().zip(channels) {
        let id = node.id();
        tasks.spawn(id, run_node(node, channels, scheduler.clone()));
    }

    let mut progress = Progress::default();
    let stop = coordinate(
        &config,
        &scheduler,
        &controls,
        &cancel,
        &mut tasks,
        &mut progress,
    )
    .await;
    let stop = match stop {
        Err(failure @ RuntimeError::TaskFailed { .. }) => {
            tasks.set.shutdown().await;
            return Err(failure);
        }
        stop => stop,
    };

    // Every node is parked at the round barrier; release them into the halt.
    scheduler.halt();
    tasks.cross(scheduler.begin_round()).await?;
    let outcomes = tasks.join_all().await?;

    let stop = stop?;
    info!(
        reason = ?stop,
        rounds = progress.rounds,
        messages = progress.messages_sent,
        "Ring runtime halted"
    );
    Ok(report(stop, progress, outcomes))
}

/// Decide, drive one round, repeat. Returns only at a decision point, when
/// every node task is waiting to begin the next round.
async fn coordinate(
    config: &RuntimeConfig,
    scheduler: &RoundScheduler,
    controls: &[NodeControl],
    cancel: &CancellationToken,
    tasks: &mut NodeTasks,
    progress: &mut Progress,
) -> Result<StopReason, RuntimeError> {
    let mut pending: Vec<RouteOrder> = config.requests.clone();

    loop {
        if progress.rounds > 0 {
            let statuses: Vec<NodeStatus> = controls
                .iter()
                .map(|control| control.status.borrow().clone())
                .collect();
            if let Some(failure) = statuses.iter().find_map(|status| status.failure.clone()) {
                return Err(failure);
            }

            let last = Round(progress.rounds - 1);
            let complete = statuses.iter().all(|status| status.complete);
            if complete && progress.converged_at.is_none() {
                progress.converged_at = Some(last);
                info!(round = last.0, "All routing tables complete");
            }

            let sent: u64 = statuses.iter().map(|status| status.sent).sum();
            let received: u64 = statuses.iter().map(|status| status.received).sum();
            progress.messages_sent = sent;
            let in_flight = sent.saturating_sub(received);
            debug!(round = last.0, in_flight, complete, "Round finished");

            if cancel.is_cancelled() {
                warn!(round = last.0, "Ring runtime cancelled");
                return Ok(StopReason::Cancelled);
            }

            let release = !pending.is_empty()
                && (config.inject_at == InjectAt::AfterInit || complete);
            if release {
                for order in pending.drain(..) {
                    let origin = order.origin;
                    let control = controls
                        .get(origin.index())
                        .ok_or(RuntimeError::ChannelClosed(origin))?;
                    control
                        .orders
                        .send(order)
                        .map_err(|_| RuntimeError::ChannelClosed(origin))?;
                }
            } else if pending.is_empty() && in_flight == 0 {
                return Ok(StopReason::Quiescent);
            }

            if progress.rounds >= config.max_rounds {
                return Err(RuntimeError::RoundBudgetExhausted {
                    max_rounds: config.max_rounds,
                });
            }
        }

        tasks.cross(scheduler.begin_round()).await?;
        tasks.cross(scheduler.end_processing()).await?;
        tasks.cross(scheduler.end_flush()).await?;
        progress.rounds += 1;
    }
}

fn report(stop: StopReason, progress: Progress, outcomes: Vec<NodeOutcome>) -> RuntimeReport {
    let mut deliveries = Vec::new();
    let mut drops = Vec::new();
    let mut tables = Vec::with_capacity(outcomes.len());
    let mut node_stats = Vec::with_capacity(outcomes.len());
    let mut dumps = Vec::with_capacity(outcomes.len());

    for outcome in outcomes {
        tables.push(outcome.node.table().clone());
        node_stats.push(outcome.node.stats());
        dumps.push(outcome.node.dump());
        deliveries.extend(outcome.deliveries);
        drops.extend(outcome.drops);
    }
    deliveries.sort_by_key(|record| (record.round, record.delivery.target));
    drops.sort_by_key(|record| (record.round, record.dropped.at));

    RuntimeReport {
        stop,
        rounds: progress.rounds,
        converged_at: progress.converged_at,
        messages_sent: progress.messages_sent,
        tables,
        node_stats,
        dumps,
        deliveries,
        drops,
    }
}

impl RuntimeReport {
    /// Whether every table was complete at some point of the run.
    pub fn converged(&self) -> bool {
        self.converged_at.is_some()
    }

    /// Whether every final table is complete for a ring of its size.
    pub fn all_complete(&self) -> bool {
        let node_count = self.tables.len() as u32;
        self.tables
            .iter()
            .all(|table| is_complete(table, node_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn crashing_ring(scheduler: &Arc<RoundScheduler>, crashed: u32) -> NodeTasks {
        let mut tasks = NodeTasks::default();
        for id in 0..3 {
            let scheduler = scheduler.clone();
            tasks.spawn(NodeId(id), async move {
                scheduler.begin_round().await;
                if id == crashed {
                    panic!("node task crashed");
                }
                scheduler.end_processing().await;
                std::future::pending::<NodeOutcome>().await
            });
        }
        tasks
    }

    #[tokio::test]
    async fn test_crossing_fails_when_a_task_panics() {
        let scheduler = Arc::new(RoundScheduler::new(3));
        let mut tasks = crashing_ring(&scheduler, 1);

        assert_eq!(tasks.cross(scheduler.begin_round()).await, Ok(true));

        let crossed = tokio::time::timeout(
            Duration::from_secs(10),
            tasks.cross(scheduler.end_processing()),
        )
        .await
        .expect("coordinator stayed parked at the barrier");

        assert!(matches!(
            crossed,
            Err(RuntimeError::TaskFailed { node: NodeId(1), ref reason }) if reason.contains("panic")
        ));
    }

    #[tokio::test]
    async fn test_crossing_fails_when_a_task_returns_early() {
        let scheduler = Arc::new(RoundScheduler::new(1));
        let topology = Arc::new(RingTopology::new(1).unwrap());
        let node = NodeStateMachine::new(NodeId(0), topology).unwrap();

        let mut tasks = NodeTasks::default();
        tasks.spawn(NodeId(0), async move {
            NodeOutcome {
                node,
                deliveries: vec![],
                drops: vec![],
            }
        });

        assert_eq!(
            tasks.cross(scheduler.begin_round()).await,
            Err(RuntimeError::TaskFailed {
                node: NodeId(0),
                reason: "exited before the halt".into(),
            })
        );
    }
}
