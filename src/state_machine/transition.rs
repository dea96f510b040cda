//! Pure state transition function
//!
//! Given the same state and event this always produces the same result, with
//! no I/O. At most one request is in flight: a message arriving while
//! `Pending` is rejected, not queued.

use super::{ChatOutcome, ChatRequestState, Effect, Event};
use thiserror::Error;

/// Transcript text shown when a chat request fails, whatever the cause
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error. Is the backend running?";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatRequestState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatRequestState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    /// True when the transition changed nothing
    pub fn is_noop(&self) -> bool {
        self.effects.is_empty()
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Tutor is still answering, wait for the reply before sending again")]
    AgentBusy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &ChatRequestState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Blank input never leaves the client
        (_, Event::UserMessage { text, .. }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyMessage)
        }

        (ChatRequestState::Pending { .. }, Event::UserMessage { .. }) => {
            Err(TransitionError::AgentBusy)
        }

        // Idle/Failed + UserMessage -> Pending (Failed recovers here)
        (
            ChatRequestState::Idle | ChatRequestState::Failed { .. },
            Event::UserMessage { text, handle },
        ) => {
            let text = text.trim().to_string();
            Ok(TransitionResult::new(ChatRequestState::Pending {
                text: text.clone(),
                handle,
            })
            .with_effect(Effect::append_local(text.clone()))
            .with_effect(Effect::RequestChat { handle, text })
            .with_effect(Effect::NotifyStateChange))
        }

        // Pending + matching completion -> Idle / Failed
        (ChatRequestState::Pending { handle: current, .. }, Event::ChatCompleted { handle, outcome })
            if *current == handle =>
        {
            match outcome {
                ChatOutcome::Success {
                    text,
                    workspace_update,
                } => Ok(TransitionResult::new(ChatRequestState::Idle)
                    .with_effect(Effect::append_remote(text))
                    .with_effects(
                        workspace_update.map(|update| Effect::MergeWorkspace { update }),
                    )
                    .with_effect(Effect::NotifyStateChange)),
                ChatOutcome::Failure { reason } => {
                    Ok(TransitionResult::new(ChatRequestState::Failed { reason })
                        .with_effect(Effect::append_system(CONNECTION_ERROR_MESSAGE))
                        .with_effect(Effect::NotifyStateChange))
                }
            }
        }

        // Stale handle, or nothing pending: ignore
        (state, Event::ChatCompleted { .. }) => Ok(TransitionResult::new(state.clone())),
    }
}
