//! Per-node routing state machine.
//!
//! This crate wires the pure routing functions (merge, convergence, router)
//! into a node that owns its routing table, reacts to one message per round
//! and re-broadcasts its table whenever it changes.

mod state;

pub use state::{NodePhase, NodeStateMachine, NodeStats};
