//! Chat request lifecycle
//!
//! Implements the Elm Architecture pattern with pure state transitions: the
//! session feeds events in and carries out the returned effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{ChatOutcome, Event};
pub use state::{ChatRequestState, RequestHandle};
pub use transition::{transition, TransitionError, TransitionResult, CONNECTION_ERROR_MESSAGE};
