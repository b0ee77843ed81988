//! End-to-end runs of the ring over the deterministic simulation.

use ringrip_core::StateMachine;
use ringrip_simulation::{NetworkConfig, SimulationRunner};
use ringrip_test_helpers::converged_ring_table;
use ringrip_types::{NodeId, Round, Topology};
use tracing_test::traced_test;

fn quiescent_runner(node_count: u32) -> SimulationRunner {
    let mut runner = SimulationRunner::new(NetworkConfig::new(node_count)).unwrap();
    runner.run_until_quiescent().unwrap();
    runner
}

#[traced_test]
#[test]
fn test_rings_converge_to_shortest_distances() {
    for n in 1..=12 {
        let runner = quiescent_runner(n);
        let ring = runner.topology();

        for node in runner.nodes() {
            let table = node.table();
            assert_eq!(
                table.destination_count(),
                n as usize - 1,
                "n={n} {}",
                node.dump()
            );
            for destination in ring.nodes().filter(|d| *d != node.id()) {
                assert_eq!(
                    table.distance(destination),
                    Some(ring.distance(node.id(), destination)),
                    "n={n} {}",
                    node.dump()
                );
            }
            assert!(node.is_complete(), "n={n} {}", node.dump());
        }
        assert!(runner.is_converged());
    }
}

#[traced_test]
#[test]
fn test_odd_rings_pick_the_unique_shortest_next_hop() {
    for n in [3, 5, 7, 9] {
        let runner = quiescent_runner(n);
        for node in runner.nodes() {
            assert_eq!(*node.table(), converged_ring_table(n, node.id().0));
        }
    }
}

#[traced_test]
#[test]
fn test_five_node_ring_entries() {
    let runner = quiescent_runner(5);
    let node0 = runner.node(NodeId(0)).unwrap();

    assert_eq!(node0.table().next_hop(NodeId(2)), Some(NodeId(1)));
    assert_eq!(node0.table().distance(NodeId(2)), Some(2));
    assert_eq!(node0.table().next_hop(NodeId(3)), Some(NodeId(4)));
    assert_eq!(node0.table().distance(NodeId(3)), Some(2));
}

#[traced_test]
#[test]
fn test_converged_at_is_recorded_before_quiescence() {
    let runner = quiescent_runner(8);
    let converged_at = runner.stats().converged_at.unwrap();
    assert!(converged_at <= runner.round());
    assert!(converged_at > Round::ZERO);
}

#[traced_test]
#[test]
fn test_single_node_ring_is_converged_immediately() {
    let mut runner = SimulationRunner::new(NetworkConfig::new(1)).unwrap();
    runner.start().unwrap();

    assert!(runner.is_converged());
    assert!(runner.is_quiescent());
    assert_eq!(runner.stats().messages_sent, 0);
    assert_eq!(runner.stats().converged_at, Some(Round::ZERO));
}

#[traced_test]
#[test]
fn test_request_before_convergence_is_dropped_at_origin() {
    let mut runner = SimulationRunner::new(NetworkConfig::new(7)).unwrap();
    runner.start().unwrap();
    runner
        .inject_request(NodeId(0), NodeId(3), "too early")
        .unwrap();
    runner.run_until_quiescent().unwrap();

    let stats = runner.stats();
    assert!(stats.deliveries.is_empty());
    assert_eq!(stats.drops.len(), 1);
    assert_eq!(stats.drops[0].dropped.at, NodeId(0));
    assert_eq!(stats.drops[0].round, Round(1));
    assert_eq!(stats.route_requests_sent, 0);
    assert!(logs_contain("Dropping routed message: unknown route"));
}

#[traced_test]
#[test]
fn test_request_after_convergence_is_delivered_once() {
    let mut runner = quiescent_runner(7);
    runner
        .inject_request(NodeId(0), NodeId(3), "hello")
        .unwrap();
    runner.run_until_quiescent().unwrap();

    let stats = runner.stats();
    assert!(stats.drops.is_empty());
    assert_eq!(stats.deliveries.len(), 1);

    let delivered = &stats.deliveries[0].delivery;
    assert_eq!(delivered.origin, NodeId(0));
    assert_eq!(delivered.target, NodeId(3));
    assert_eq!(delivered.payload, "hello");

    // 0 -> 1 -> 2 -> 3
    assert_eq!(stats.route_requests_sent, 3);
    assert_eq!(runner.node(NodeId(1)).unwrap().stats().forwarded, 1);
}

#[traced_test]
#[test]
fn test_request_to_self_is_delivered_without_sending() {
    let mut runner = quiescent_runner(4);
    runner.inject_request(NodeId(2), NodeId(2), "me").unwrap();

    assert_eq!(runner.stats().deliveries.len(), 1);
    assert_eq!(runner.stats().route_requests_sent, 0);
    assert!(runner.is_quiescent());
}

#[traced_test]
#[test]
fn test_runs_are_reproducible() {
    let run = || {
        let mut runner = SimulationRunner::new(NetworkConfig::new(10)).unwrap();
        runner.start().unwrap();
        runner.inject_request(NodeId(4), NodeId(9), "early").unwrap();
        runner.run_rounds(6).unwrap();
        runner.inject_request(NodeId(1), NodeId(6), "mid").unwrap();
        runner.run_until_quiescent().unwrap();
        (runner.stats().clone(), runner.tables())
    };

    assert_eq!(run(), run());
}
