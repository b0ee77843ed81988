//! Ring routing simulator.
//!
//! Harness around the routing nodes: builds a ring from a
//! [`SimulatorConfig`], originates a seeded request workload, runs it on the
//! deterministic simulation or the task runtime, and reports the outcome
//! together with every node's final routing table.
//!
//! # Example
//!
//! ```ignore
//! use ringrip_simulator::{Simulator, SimulatorConfig, WorkloadConfig};
//!
//! let config = SimulatorConfig::new(9)
//!     .with_seed(7)
//!     .with_workload(WorkloadConfig::default().with_requests(20));
//!
//! let report = Simulator::new(config)?.run()?;
//! println!("{report}");
//! ```

pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod workload;

pub use config::{SimulatorConfig, WorkloadConfig};
pub use error::{ConfigError, SimulatorError};
pub use report::{SimulationReport, Substrate};
pub use runner::Simulator;
pub use workload::{RequestWorkload, WorkloadGenerator};
