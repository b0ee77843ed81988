//! Core types for ring routing nodes.
//!
//! A node is a synchronous state machine: the runner feeds it [`Event`]s and
//! performs the [`Action`]s it returns. Nodes never touch the substrate
//! directly, which keeps every protocol step deterministic and testable
//! without a scheduler.

mod action;
mod error;
mod event;
mod traits;

pub use action::{Action, Delivery, DeliveryRecord, DropRecord, DroppedRequest};
pub use error::ProtocolError;
pub use event::{Event, RouteOrder};
pub use traits::StateMachine;
