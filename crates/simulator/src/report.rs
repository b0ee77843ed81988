//! Run reports.

use ringrip_core::{DeliveryRecord, DropRecord};
use ringrip_types::Round;
use serde::Serialize;
use std::fmt;

/// Which substrate produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Substrate {
    /// Deterministic round-synchronous simulation.
    Simulation,
    /// One tokio task per node.
    Runtime,
}

impl fmt::Display for Substrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Substrate::Simulation => write!(f, "simulation"),
            Substrate::Runtime => write!(f, "runtime"),
        }
    }
}

/// Summary of a run plus the final routing tables.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Substrate the ring ran on.
    pub substrate: Substrate,
    /// Ring size.
    pub nodes: u32,
    /// Workload seed.
    pub seed: u64,
    /// Rounds run, Init included.
    pub rounds: u64,
    /// Round in which every table was first complete.
    pub converged_at: Option<Round>,
    /// Every final table is complete.
    pub all_complete: bool,
    /// Messages sent across all nodes.
    pub messages_sent: u64,
    /// Route requests originated.
    pub requests: usize,
    /// Delivered payloads.
    pub deliveries: Vec<DeliveryRecord>,
    /// Dropped requests.
    pub drops: Vec<DropRecord>,
    /// Per-node table dumps, indexed by node id.
    pub tables: Vec<String>,
}

impl SimulationReport {
    /// Fraction of requests that reached their target.
    pub fn delivery_ratio(&self) -> f64 {
        if self.requests == 0 {
            return 1.0;
        }
        self.deliveries.len() as f64 / self.requests as f64
    }

    /// Render as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Ring routing report ({}) ===", self.substrate)?;
        writeln!(f, "nodes:         {}", self.nodes)?;
        writeln!(f, "seed:          {}", self.seed)?;
        writeln!(f, "rounds:        {}", self.rounds)?;
        match self.converged_at {
            Some(round) => writeln!(f, "converged at:  {}", round)?,
            None => writeln!(f, "converged at:  never")?,
        }
        writeln!(f, "all complete:  {}", self.all_complete)?;
        writeln!(f, "messages sent: {}", self.messages_sent)?;
        writeln!(
            f,
            "requests:      {} ({} delivered, {} dropped, {:.1}%)",
            self.requests,
            self.deliveries.len(),
            self.drops.len(),
            self.delivery_ratio() * 100.0
        )?;
        for drop in &self.drops {
            writeln!(
                f,
                "  dropped at {} in {}: {} -> {} {:?}",
                drop.dropped.at,
                drop.round,
                drop.dropped.request.origin,
                drop.dropped.request.target,
                drop.dropped.request.payload
            )?;
        }
        writeln!(f, "--- routing tables ---")?;
        for table in &self.tables {
            writeln!(f, "{table}")?;
        }
        Ok(())
    }
}
