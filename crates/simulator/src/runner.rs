//! Simulator: runs the configured ring and workload on either substrate.

use crate::{
    RequestWorkload, SimulationReport, SimulatorConfig, SimulatorError, Substrate,
    WorkloadGenerator,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ringrip_core::RouteOrder;
use ringrip_runtime::InjectAt;
use ringrip_simulation::SimulationRunner;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Runs one configured scenario.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    /// Create a simulator, rejecting configurations no run can satisfy.
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulatorError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// The requests this configuration originates. Same seed, same requests.
    pub fn orders(&self) -> Vec<RouteOrder> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        RequestWorkload::new(self.config.nodes)
            .with_allow_self(self.config.workload.allow_self)
            .generate_batch(self.config.workload.requests, &mut rng)
    }

    /// Run on the deterministic simulation: Init, originate the workload at
    /// the configured point, then drain the network.
    pub fn run(&self) -> Result<SimulationReport, SimulatorError> {
        let orders = self.orders();
        let requests = orders.len();
        let mut runner = SimulationRunner::new(self.config.to_network_config())?;

        info!(
            nodes = self.config.nodes,
            seed = self.config.seed,
            requests,
            "Running deterministic simulation"
        );

        runner.start()?;
        if self.config.workload.inject_at == InjectAt::AfterConvergence {
            runner.run_until_converged()?;
        }
        for order in orders {
            runner.inject(order)?;
        }
        runner.run_until_quiescent()?;

        let stats = runner.stats();
        Ok(SimulationReport {
            substrate: Substrate::Simulation,
            nodes: self.config.nodes,
            seed: self.config.seed,
            rounds: runner.round().0,
            converged_at: stats.converged_at,
            all_complete: runner.is_converged(),
            messages_sent: stats.messages_sent,
            requests,
            deliveries: stats.deliveries.clone(),
            drops: stats.drops.clone(),
            tables: runner.nodes().iter().map(|node| node.dump()).collect(),
        })
    }

    /// Run on the task runtime until it goes quiet or `cancel` fires.
    pub async fn run_runtime(
        &self,
        cancel: CancellationToken,
    ) -> Result<SimulationReport, SimulatorError> {
        let orders = self.orders();
        let requests = orders.len();
        let config = self.config.to_runtime_config(orders);

        let report = ringrip_runtime::run(config, cancel).await?;
        let all_complete = report.all_complete();

        Ok(SimulationReport {
            substrate: Substrate::Runtime,
            nodes: self.config.nodes,
            seed: self.config.seed,
            rounds: report.rounds,
            converged_at: report.converged_at,
            all_complete,
            messages_sent: report.messages_sent,
            requests,
            deliveries: report.deliveries,
            drops: report.drops,
            tables: report.dumps,
        })
    }
}
