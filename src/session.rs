//! Conversation & workspace session
//!
//! A session ties one enrollment to its transcript, request lifecycle,
//! workspace snapshot and notes draft. Sessions never share any of these;
//! opening another enrollment means a new session.

use crate::backend::{EnrollmentId, EnrollmentRef, UploadReceipt};
use crate::state_machine::{
    transition, ChatOutcome, ChatRequestState, Effect, Event, RequestHandle, TransitionError,
    TransitionResult,
};
use crate::transcript::{Sender, TranscriptEntry, TranscriptStore};
use crate::workspace::{merge, WorkspaceSnapshot};
use thiserror::Error;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Errors surfaced to the caller of session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] TransitionError),
    #[error("Enrollment {active} is already open, leave it before opening {requested}")]
    AlreadyActive {
        active: EnrollmentId,
        requested: EnrollmentId,
    },
    #[error("No enrollment is open")]
    NoSession,
}

/// Observable session changes, for re-rendering and scroll-to-end
#[derive(Debug, Clone)]
pub enum SessionEvent {
    EntryAppended(TranscriptEntry),
    StateChanged(ChatRequestState),
    WorkspaceChanged(WorkspaceSnapshot),
}

/// A message accepted by [`Session::send`] that the caller must now deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChat {
    pub handle: RequestHandle,
    pub enrollment_id: EnrollmentId,
    pub text: String,
}

pub struct Session {
    id: String,
    enrollment: EnrollmentRef,
    transcript: TranscriptStore,
    request_state: ChatRequestState,
    workspace: WorkspaceSnapshot,
    notes: String,
    next_handle: RequestHandle,
    events_tx: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Open a session for an enrollment, seeding the welcome entry and snapshot
    pub fn start(enrollment: EnrollmentRef, notes: String) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let mut transcript = TranscriptStore::new();
        transcript.append(Sender::Remote, welcome_text(&enrollment.course_title));

        let session = Self {
            id: uuid::Uuid::new_v4().to_string(),
            workspace: WorkspaceSnapshot::from_enrollment(&enrollment),
            enrollment,
            transcript,
            request_state: ChatRequestState::Idle,
            notes,
            next_handle: RequestHandle::first(),
            events_tx,
        };
        tracing::info!(
            session_id = %session.id,
            enrollment_id = %session.enrollment.enrollment_id,
            "Session started"
        );
        session
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn enrollment(&self) -> &EnrollmentRef {
        &self.enrollment
    }

    /// Subscribe to transcript, state and workspace changes
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    /// Header label, e.g. `Tera • Finance 101`
    pub fn course_label(&self) -> String {
        let parts: Vec<&str> = [
            self.enrollment.agent_name.as_deref().unwrap_or_default(),
            self.enrollment.course_title.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();

        if parts.is_empty() {
            "Homegrown".to_string()
        } else {
            parts.join(" • ")
        }
    }

    // ==================== Chat ====================

    /// Start a chat request
    ///
    /// The local entry is appended right away. The caller delivers the
    /// returned [`PendingChat`] and reports back through [`Self::complete_send`].
    pub fn send(&mut self, text: &str) -> Result<PendingChat, SessionError> {
        let handle = self.next_handle;
        let result = transition(
            &self.request_state,
            Event::UserMessage {
                text: text.to_string(),
                handle,
            },
        )
        .inspect_err(|e| tracing::debug!(session_id = %self.id, error = %e, "Message rejected"))?;

        self.next_handle = handle.next();
        self.apply(result)
            .ok_or_else(|| TransitionError::InvalidTransition("send emitted no chat request".to_string()))
            .map_err(SessionError::from)
    }

    /// Report how the request started by `handle` ended
    ///
    /// Returns `false` when the handle is stale and nothing changed.
    pub fn complete_send(&mut self, handle: RequestHandle, outcome: ChatOutcome) -> bool {
        if let ChatOutcome::Failure { reason } = &outcome {
            tracing::warn!(session_id = %self.id, %handle, reason = %reason, "Chat request failed");
        }

        match transition(&self.request_state, Event::ChatCompleted { handle, outcome }) {
            Ok(result) if result.is_noop() => {
                tracing::debug!(session_id = %self.id, %handle, "Ignoring stale chat completion");
                false
            }
            Ok(result) => {
                self.apply(result);
                true
            }
            Err(e) => {
                tracing::error!(session_id = %self.id, error = %e, "Unexpected completion error");
                false
            }
        }
    }

    /// Commit a transition: swap in the new state, then run its effects
    fn apply(&mut self, result: TransitionResult) -> Option<PendingChat> {
        let old_state = std::mem::replace(&mut self.request_state, result.new_state);
        if old_state.name() != self.request_state.name() {
            tracing::debug!(
                session_id = %self.id,
                from = old_state.name(),
                to = self.request_state.name(),
                "Request state changed"
            );
        }

        let mut dispatched = None;
        for effect in result.effects {
            match effect {
                Effect::AppendEntry { sender, text } => {
                    self.append(sender, text);
                }
                Effect::MergeWorkspace { update } => {
                    self.workspace = merge(&self.workspace, &update);
                    let _ = self
                        .events_tx
                        .send(SessionEvent::WorkspaceChanged(self.workspace.clone()));
                }
                Effect::RequestChat { handle, text } => {
                    dispatched = Some(PendingChat {
                        handle,
                        enrollment_id: self.enrollment.enrollment_id,
                        text,
                    });
                }
                Effect::NotifyStateChange => {
                    let _ = self
                        .events_tx
                        .send(SessionEvent::StateChanged(self.request_state.clone()));
                }
            }
        }
        dispatched
    }

    fn append(&mut self, sender: Sender, text: impl Into<String>) -> TranscriptEntry {
        let entry = self.transcript.append(sender, text).clone();
        let _ = self.events_tx.send(SessionEvent::EntryAppended(entry.clone()));
        entry
    }

    // ==================== Uploads ====================

    /// Log a finished upload in the transcript
    pub fn record_upload(&mut self, receipt: &UploadReceipt) -> TranscriptEntry {
        self.append(Sender::System, format!("Uploaded {}", receipt.filename))
    }

    // ==================== Notes ====================

    /// Current notes draft for this enrollment
    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    // ==================== Read model ====================

    pub fn current_transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.list()
    }

    pub fn transcript(&self) -> &TranscriptStore {
        &self.transcript
    }

    pub fn current_workspace(&self) -> &WorkspaceSnapshot {
        &self.workspace
    }

    pub fn current_request_state(&self) -> &ChatRequestState {
        &self.request_state
    }
}

fn welcome_text(course_title: &str) -> String {
    let course = if course_title.is_empty() {
        "your course"
    } else {
        course_title
    };
    format!("Welcome! You're in {course}. Say hello to begin.")
}
