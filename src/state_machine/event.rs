//! Events that drive the request lifecycle

use super::state::RequestHandle;
use crate::backend::{BackendError, ChatReply};
use crate::workspace::WorkspaceUpdate;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// The learner submitted a message
    UserMessage { text: String, handle: RequestHandle },

    /// The backend call started by `handle` resolved
    ChatCompleted {
        handle: RequestHandle,
        outcome: ChatOutcome,
    },
}

/// How a chat request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    Success {
        text: String,
        workspace_update: Option<WorkspaceUpdate>,
    },
    Failure {
        reason: String,
    },
}

impl ChatOutcome {
    pub fn success(text: impl Into<String>, workspace_update: Option<WorkspaceUpdate>) -> Self {
        ChatOutcome::Success {
            text: text.into(),
            workspace_update,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        ChatOutcome::Failure {
            reason: reason.into(),
        }
    }
}

impl From<Result<ChatReply, BackendError>> for ChatOutcome {
    fn from(result: Result<ChatReply, BackendError>) -> Self {
        match result {
            Ok(reply) => ChatOutcome::success(reply.agent_response, reply.workspace_update),
            Err(e) => ChatOutcome::failure(e.to_string()),
        }
    }
}
