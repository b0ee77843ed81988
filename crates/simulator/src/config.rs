//! Configuration types for the simulator.

use crate::ConfigError;
use ringrip_core::RouteOrder;
use ringrip_runtime::{InjectAt, RuntimeConfig};
use ringrip_simulation::NetworkConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a simulation run.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// nodes = 9
/// seed = 7
///
/// [workload]
/// requests = 20
/// inject_at = "after_init"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Number of nodes on the ring.
    pub nodes: u32,

    /// Upper bound on rounds, Init included.
    pub max_rounds: u64,

    /// Random seed for the request workload.
    pub seed: u64,

    /// Workload configuration.
    pub workload: WorkloadConfig,
}

impl SimulatorConfig {
    /// Create a new simulator configuration.
    pub fn new(nodes: u32) -> Self {
        Self {
            nodes,
            max_rounds: 1000,
            seed: 12345,
            workload: WorkloadConfig::default(),
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject configurations no run can satisfy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes == 0 {
            return Err(ConfigError::Invalid("nodes must be at least 1".into()));
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::Invalid("max_rounds must be at least 1".into()));
        }
        Ok(())
    }

    /// Set the ring size.
    pub fn with_nodes(mut self, nodes: u32) -> Self {
        self.nodes = nodes;
        self
    }

    /// Set the round budget.
    pub fn with_max_rounds(mut self, max_rounds: u64) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the workload configuration.
    pub fn with_workload(mut self, workload: WorkloadConfig) -> Self {
        self.workload = workload;
        self
    }

    /// Convert to a NetworkConfig for the deterministic simulation.
    pub fn to_network_config(&self) -> NetworkConfig {
        NetworkConfig::new(self.nodes).with_max_rounds(self.max_rounds)
    }

    /// Convert to a RuntimeConfig for the task runtime.
    pub fn to_runtime_config(&self, requests: Vec<RouteOrder>) -> RuntimeConfig {
        RuntimeConfig::new(self.nodes)
            .with_max_rounds(self.max_rounds)
            .with_requests(requests)
            .with_inject_at(self.workload.inject_at)
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self::new(5)
    }
}

/// Workload configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkloadConfig {
    /// Number of route requests to originate.
    pub requests: usize,

    /// When requests are originated.
    pub inject_at: InjectAt,

    /// Whether a request may target its own origin.
    pub allow_self: bool,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            requests: 10,
            inject_at: InjectAt::AfterConvergence,
            allow_self: false,
        }
    }
}

impl WorkloadConfig {
    /// Set the number of requests.
    pub fn with_requests(mut self, requests: usize) -> Self {
        self.requests = requests;
        self
    }

    /// Set when requests are originated.
    pub fn with_inject_at(mut self, inject_at: InjectAt) -> Self {
        self.inject_at = inject_at;
        self
    }

    /// Originate requests right after Init, before tables spread.
    pub fn early(self) -> Self {
        self.with_inject_at(InjectAt::AfterInit)
    }

    /// Allow requests addressed to their own origin.
    pub fn with_allow_self(mut self, allow_self: bool) -> Self {
        self.allow_self = allow_self;
        self
    }
}
