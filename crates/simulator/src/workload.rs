//! Route request workload generation.

use ringrip_core::RouteOrder;
use ringrip_types::NodeId;

/// Trait for generating route request workloads.
pub trait WorkloadGenerator {
    /// Generate a single request.
    fn generate_one(&mut self, rng: &mut impl rand::Rng) -> Option<RouteOrder>;

    /// Generate up to `count` requests.
    fn generate_batch(&mut self, count: usize, rng: &mut impl rand::Rng) -> Vec<RouteOrder> {
        let mut orders = Vec::with_capacity(count);
        for _ in 0..count {
            if let Some(order) = self.generate_one(rng) {
                orders.push(order);
            }
        }
        orders
    }
}

/// Uniformly random origin and target pairs on a ring.
#[derive(Debug, Clone)]
pub struct RequestWorkload {
    node_count: u32,
    allow_self: bool,
    issued: u64,
}

impl RequestWorkload {
    /// Create a workload over `node_count` nodes.
    pub fn new(node_count: u32) -> Self {
        Self {
            node_count,
            allow_self: false,
            issued: 0,
        }
    }

    /// Allow requests addressed to their own origin.
    pub fn with_allow_self(mut self, allow_self: bool) -> Self {
        self.allow_self = allow_self;
        self
    }

    /// Requests generated so far.
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

impl WorkloadGenerator for RequestWorkload {
    fn generate_one(&mut self, rng: &mut impl rand::Rng) -> Option<RouteOrder> {
        if self.node_count == 0 {
            return None;
        }
        // A single node can only address itself.
        let allow_self = self.allow_self || self.node_count == 1;

        let origin = rng.gen_range(0..self.node_count);
        let target = if allow_self {
            rng.gen_range(0..self.node_count)
        } else {
            // Skip over the origin so the pick stays uniform over the others.
            let pick = rng.gen_range(0..self.node_count - 1);
            if pick >= origin {
                pick + 1
            } else {
                pick
            }
        };

        let payload = format!("msg-{}", self.issued);
        self.issued += 1;
        Some(RouteOrder::new(NodeId(origin), NodeId(target), payload))
    }
}
