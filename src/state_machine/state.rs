//! Request lifecycle state types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one `send` attempt within a session
///
/// Handles increase monotonically, so a completion carrying an older handle
/// can be recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestHandle(u64);

impl RequestHandle {
    pub fn first() -> Self {
        Self(1)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of the session's single chat request slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatRequestState {
    /// Ready for a new message
    #[default]
    Idle,

    /// A message was sent and the reply has not arrived yet
    Pending {
        /// The message that started this request
        text: String,
        handle: RequestHandle,
    },

    /// The last request failed; the next message recovers
    Failed { reason: String },
}

impl ChatRequestState {
    /// Check if a request is in flight
    pub fn is_pending(&self) -> bool {
        matches!(self, ChatRequestState::Pending { .. })
    }

    /// Handle of the in-flight request, if any
    pub fn pending_handle(&self) -> Option<RequestHandle> {
        match self {
            ChatRequestState::Pending { handle, .. } => Some(*handle),
            _ => None,
        }
    }

    /// Short name used in logs and notifications
    pub fn name(&self) -> &'static str {
        match self {
            ChatRequestState::Idle => "idle",
            ChatRequestState::Pending { .. } => "pending",
            ChatRequestState::Failed { .. } => "failed",
        }
    }
}
