//! Core traits for state machines.

use crate::{Action, Event, ProtocolError};
use ringrip_types::{NodeId, Round};

/// A state machine that processes events.
///
/// Implementations are:
///
/// - **Synchronous**: No async, no `.await`
/// - **Deterministic**: Same state + event = same actions
/// - **Pure-ish**: Mutates self, but performs no I/O
///
/// # Example
///
/// ```ignore
/// impl StateMachine for NodeStateMachine {
///     fn handle(&mut self, event: Event) -> Result<Vec<Action>, ProtocolError> {
///         match event {
///             Event::Start => self.on_start(),
///             Event::MessageReceived(message) => self.on_message(message),
///             Event::RouteRequested { target, payload } => {
///                 self.on_route_requested(target, payload)
///             }
///         }
///     }
///     // ...
/// }
/// ```
pub trait StateMachine {
    /// The node this state machine runs.
    fn id(&self) -> NodeId;

    /// Process an event, returning actions to perform.
    ///
    /// # Guarantees
    ///
    /// - **Synchronous**: This method never blocks or awaits
    /// - **Deterministic**: Given the same state and event, always returns the same actions
    /// - **No I/O**: All I/O is performed by the runner via the returned actions
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] for integration bugs (unknown message
    /// kinds, misaddressed messages). Callers should stop the run.
    fn handle(&mut self, event: Event) -> Result<Vec<Action>, ProtocolError>;

    /// Set the current round.
    ///
    /// Called by the runner before each `handle()` call.
    fn set_round(&mut self, round: Round);

    /// Get the round that was last set via `set_round()`.
    fn round(&self) -> Round;

    /// Whether this node considers its routing table complete.
    ///
    /// A query only; never changes protocol state.
    fn is_complete(&self) -> bool;
}
