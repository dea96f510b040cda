//! Effects produced by state transitions

use super::state::RequestHandle;
use crate::transcript::Sender;
use crate::workspace::WorkspaceUpdate;

/// Effects to be carried out by the session after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append one entry to the transcript
    AppendEntry { sender: Sender, text: String },

    /// Fold a server update into the workspace snapshot
    MergeWorkspace { update: WorkspaceUpdate },

    /// Hand the message to the backend; the caller owns this call
    RequestChat { handle: RequestHandle, text: String },

    /// Tell subscribers the request state changed
    NotifyStateChange,
}

impl Effect {
    pub fn append_local(text: impl Into<String>) -> Self {
        Effect::AppendEntry {
            sender: Sender::Local,
            text: text.into(),
        }
    }

    pub fn append_remote(text: impl Into<String>) -> Self {
        Effect::AppendEntry {
            sender: Sender::Remote,
            text: text.into(),
        }
    }

    pub fn append_system(text: impl Into<String>) -> Self {
        Effect::AppendEntry {
            sender: Sender::System,
            text: text.into(),
        }
    }
}
