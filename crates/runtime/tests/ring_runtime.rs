//! The ring over real tasks and channels.

use ringrip_core::RouteOrder;
use ringrip_runtime::{run, InjectAt, RuntimeConfig, RuntimeError, StopReason};
use ringrip_types::{NodeId, RingTopology, Topology};
use tokio_util::sync::CancellationToken;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_runtime_converges_to_ring_distances() {
    for n in [1, 2, 5, 8] {
        let report = run(RuntimeConfig::new(n), CancellationToken::new())
            .await
            .unwrap();
        let ring = RingTopology::new(n).unwrap();

        assert_eq!(report.stop, StopReason::Quiescent);
        assert!(report.converged());
        assert!(report.all_complete());
        for table in &report.tables {
            let me = table.owner();
            assert_eq!(table.destination_count(), n as usize - 1);
            for destination in ring.nodes().filter(|d| *d != me) {
                assert_eq!(
                    table.distance(destination),
                    Some(ring.distance(me, destination))
                );
            }
        }
    }
    assert!(logs_contain("Ring runtime halted"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[traced_test]
async fn test_runtime_on_multi_thread_scheduler() {
    let report = run(RuntimeConfig::new(9), CancellationToken::new())
        .await
        .unwrap();
    assert!(report.all_complete());
    assert_eq!(report.dumps.len(), 9);
    assert!(report.dumps[0].starts_with("Node(0) has routing table: "));
}

#[tokio::test]
#[traced_test]
async fn test_orders_after_convergence_are_delivered() {
    let config = RuntimeConfig::new(7)
        .with_requests(vec![
            RouteOrder::new(NodeId(0), NodeId(3), "far"),
            RouteOrder::new(NodeId(5), NodeId(5), "self"),
        ])
        .with_inject_at(InjectAt::AfterConvergence);

    let report = run(config, CancellationToken::new()).await.unwrap();

    assert!(report.drops.is_empty());
    assert_eq!(report.deliveries.len(), 2);
    let payloads: Vec<&str> = report
        .deliveries
        .iter()
        .map(|record| record.delivery.payload.as_str())
        .collect();
    assert!(payloads.contains(&"far"));
    assert!(payloads.contains(&"self"));
    assert_eq!(report.node_stats[1].forwarded + report.node_stats[6].forwarded, 1);
}

#[tokio::test]
#[traced_test]
async fn test_orders_after_init_to_far_nodes_are_dropped() {
    let config = RuntimeConfig::new(7)
        .with_requests(vec![RouteOrder::new(NodeId(0), NodeId(3), "early")])
        .with_inject_at(InjectAt::AfterInit);

    let report = run(config, CancellationToken::new()).await.unwrap();

    assert!(report.deliveries.is_empty());
    assert_eq!(report.drops.len(), 1);
    assert_eq!(report.drops[0].dropped.at, NodeId(0));
}

#[tokio::test]
#[traced_test]
async fn test_cancelled_run_stops() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = run(RuntimeConfig::new(12), cancel).await.unwrap();

    assert_eq!(report.stop, StopReason::Cancelled);
    assert_eq!(report.rounds, 1);
}

#[tokio::test]
#[traced_test]
async fn test_round_budget_is_enforced() {
    let result = run(
        RuntimeConfig::new(12).with_max_rounds(3),
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(
        result,
        Err(RuntimeError::RoundBudgetExhausted { max_rounds: 3 })
    ));
}

#[tokio::test]
async fn test_orders_for_unknown_nodes_are_rejected() {
    let config = RuntimeConfig::new(3)
        .with_requests(vec![RouteOrder::new(NodeId(0), NodeId(9), "x")]);

    assert!(matches!(
        run(config, CancellationToken::new()).await,
        Err(RuntimeError::Topology(_))
    ));
}
