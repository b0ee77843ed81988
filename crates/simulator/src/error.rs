//! Simulator errors.

use ringrip_runtime::RuntimeError;
use ringrip_simulation::SimulationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors loading a [`SimulatorConfig`](crate::SimulatorConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for this config.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The values parse but cannot be run.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors from a simulator run.
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
