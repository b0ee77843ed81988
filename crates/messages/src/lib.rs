//! Network messages for the ring routing protocol.
//!
//! The protocol defines exactly two message kinds: table updates exchanged
//! between neighbors and routed application requests. [`Message`] is the
//! closed variant type the substrate carries between nodes.

mod message;
mod route_request;
mod table_update;

pub use message::{Message, NetworkMessage};
pub use route_request::RouteRequest;
pub use table_update::TableUpdate;
