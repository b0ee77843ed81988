//! Runtime configuration.

use ringrip_core::RouteOrder;
use serde::{Deserialize, Serialize};

/// When scheduled route requests are handed to their origin nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectAt {
    /// In the first round after Init, before tables have spread.
    AfterInit,
    /// Once every node's table is complete.
    #[default]
    AfterConvergence,
}

/// Configuration for a runtime run.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Ring size.
    pub node_count: u32,

    /// Hard upper bound on rounds, Init included.
    pub max_rounds: u64,

    /// Route requests to originate during the run.
    pub requests: Vec<RouteOrder>,

    /// When to originate them.
    pub inject_at: InjectAt,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            node_count: 5,
            max_rounds: 1000,
            requests: Vec::new(),
            inject_at: InjectAt::default(),
        }
    }
}

impl RuntimeConfig {
    /// Create a configuration for a ring of `node_count` nodes.
    pub fn new(node_count: u32) -> Self {
        Self {
            node_count,
            ..Default::default()
        }
    }

    /// Set the round budget.
    pub fn with_max_rounds(mut self, max_rounds: u64) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Set the route requests to originate.
    pub fn with_requests(mut self, requests: Vec<RouteOrder>) -> Self {
        self.requests = requests;
        self
    }

    /// Set when requests are originated.
    pub fn with_inject_at(mut self, inject_at: InjectAt) -> Self {
        self.inject_at = inject_at;
        self
    }
}
