//! Ring routing simulator CLI
//!
//! Runs a ring of distance-vector routing nodes, originates a seeded request
//! workload, and prints the report with every node's final routing table.

use anyhow::Context;
use clap::Parser;
use ringrip_runtime::InjectAt;
use ringrip_simulator::{Simulator, SimulatorConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ringrip-sim")]
#[command(about = "Distance-vector routing on a ring of nodes")]
#[command(version)]
struct Cli {
    /// TOML config file; flags below override its values
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Number of nodes on the ring
    #[arg(short, long)]
    nodes: Option<u32>,

    /// Upper bound on rounds
    #[arg(long)]
    max_rounds: Option<u64>,

    /// Workload seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of route requests to originate
    #[arg(short, long)]
    requests: Option<usize>,

    /// Originate requests right after Init instead of after convergence
    #[arg(long)]
    inject_early: bool,

    /// Run one tokio task per node instead of the deterministic simulation
    #[arg(long)]
    runtime: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<(SimulatorConfig, bool, bool)> {
        let mut config = match &self.config {
            Some(path) => SimulatorConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SimulatorConfig::default(),
        };

        if let Some(nodes) = self.nodes {
            config.nodes = nodes;
        }
        if let Some(max_rounds) = self.max_rounds {
            config.max_rounds = max_rounds;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(requests) = self.requests {
            config.workload.requests = requests;
        }
        if self.inject_early {
            config.workload.inject_at = InjectAt::AfterInit;
        }

        Ok((config, self.runtime, self.json))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, runtime, json) = Cli::parse().into_config()?;
    let simulator = Simulator::new(config)?;

    let report = if runtime {
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });
        simulator.run_runtime(cancel).await?
    } else {
        simulator.run()?
    };

    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{report}");
    }

    Ok(())
}
