//! Task-per-node runtime for ring routing nodes.
//!
//! Each node runs as its own tokio task and owns its state machine, its
//! inbound channel and an outbox. A coordinator task drives every node
//! through the same rounds with a shared barrier; nothing is global.
//!
//! ```text
//!   coordinator                     node tasks (N)
//!   ───────────                     ──────────────
//!   decide: halt? inject orders?
//!        │
//!   ═════╪═════ begin_round ═══════════════════════
//!        │                          orders → handle
//!        │                          try_recv (≤ 1) → handle
//!        │                          stage sends in outbox
//!   ═════╪═════ end_processing ════════════════════
//!        │                          flush outbox → inbound channels
//!        │                          publish NodeStatus (watch)
//!   ═════╪═════ end_flush ═════════════════════════
//!        ▼
//!   read statuses, next round
//! ```
//!
//! Unlike `ringrip-simulation`, inbound order between senders of the same
//! round depends on task scheduling, so tie-breaks between equal-length
//! routes may differ between runs. Distances do not.

mod channels;
mod config;
mod coordinator;
mod error;
mod scheduler;
mod task;

pub use channels::{wire, NodeChannels, NodeControl, NodeStatus, Outbox};
pub use config::{InjectAt, RuntimeConfig};
pub use coordinator::{run, RuntimeReport, StopReason};
pub use error::RuntimeError;
pub use scheduler::RoundScheduler;
pub use task::{run_node, NodeOutcome};
