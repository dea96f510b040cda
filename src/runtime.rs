//! Runtime driving sessions against the backend
//!
//! The session itself never awaits. This runtime owns the one suspension
//! point (the backend call) and feeds its result back in, downgrading every
//! network failure to a transcript entry.

use crate::backend::{EnrollmentId, EnrollmentRef, FileUpload, TutorBackend};
use crate::navigator::{preferred_enrollment, Navigator, Route};
use crate::session::{Session, SessionError};
use crate::state_machine::{ChatOutcome, ChatRequestState};
use crate::storage::Preferences;
use thiserror::Error;

/// Shown on the welcome screen when enrollments cannot be listed
pub const ENROLLMENTS_UNAVAILABLE_MESSAGE: &str =
    "Could not load enrollments. Is the backend running?";

/// Shown in the upload panel when an upload fails
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed. Check backend logs.";

#[derive(Debug, Error)]
#[error("{}", ENROLLMENTS_UNAVAILABLE_MESSAGE)]
pub struct WelcomeError {
    #[source]
    pub source: crate::backend::BackendError,
}

/// Enrollments for the welcome screen plus the one to preselect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentChoice {
    pub enrollments: Vec<EnrollmentRef>,
    pub preferred: Option<EnrollmentId>,
}

impl EnrollmentChoice {
    pub fn preferred_enrollment(&self) -> Option<&EnrollmentRef> {
        self.preferred
            .and_then(|id| self.enrollments.iter().find(|e| e.enrollment_id == id))
    }
}

/// Result of an upload, as shown in the upload panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Uploaded { filename: String },
    Failed { message: String },
}

pub struct SessionRuntime<B: TutorBackend> {
    backend: B,
    prefs: Preferences,
    navigator: Navigator,
}

impl<B: TutorBackend> SessionRuntime<B> {
    pub fn new(backend: B, prefs: Preferences) -> Self {
        Self {
            backend,
            prefs,
            navigator: Navigator::new(),
        }
    }

    pub fn route(&self) -> &Route {
        self.navigator.route()
    }

    pub fn session(&self) -> Option<&Session> {
        self.navigator.session()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    // ==================== Welcome ====================

    /// List enrollments and work out which one to preselect
    pub async fn load_enrollments(&self) -> Result<EnrollmentChoice, WelcomeError> {
        let enrollments = self
            .backend
            .list_enrollments()
            .await
            .map_err(|source| WelcomeError { source })?;

        let stored = self.prefs.last_enrollment_id();
        let preferred =
            preferred_enrollment(&enrollments, stored.as_deref()).map(|e| e.enrollment_id);

        Ok(EnrollmentChoice {
            enrollments,
            preferred,
        })
    }

    /// Open the workspace for an enrollment, remembering it for next time
    pub fn enter_workspace(&mut self, enrollment: EnrollmentRef) -> Result<&mut Session, SessionError> {
        let enrollment_id = enrollment.enrollment_id;
        let notes = self.prefs.notes(enrollment_id);
        let session = self.navigator.select_enrollment(enrollment, notes)?;
        self.prefs.remember_enrollment(enrollment_id);
        Ok(session)
    }

    pub fn leave_workspace(&mut self) -> Option<Session> {
        self.navigator.leave_workspace()
    }

    // ==================== Workspace ====================

    /// Send a chat message and wait for the reply
    ///
    /// Only local validation errors reach the caller. Backend failures end
    /// up as a system transcript entry and a `Failed` request state.
    pub async fn send_message(&mut self, text: &str) -> Result<ChatRequestState, SessionError> {
        let session = self.navigator.session_mut().ok_or(SessionError::NoSession)?;
        let pending = session.send(text)?;

        tracing::debug!(
            session_id = %session.id(),
            handle = %pending.handle,
            "Delivering chat message"
        );
        let outcome = ChatOutcome::from(
            self.backend
                .send_chat(pending.enrollment_id, &pending.text)
                .await,
        );

        session.complete_send(pending.handle, outcome);
        Ok(session.current_request_state().clone())
    }

    /// Upload a file for the open enrollment
    pub async fn upload(&mut self, file: FileUpload) -> Result<UploadStatus, SessionError> {
        let session = self.navigator.session_mut().ok_or(SessionError::NoSession)?;
        let enrollment_id = session.enrollment().enrollment_id;

        match self.backend.upload_file(enrollment_id, file).await {
            Ok(receipt) if receipt.ok => {
                session.record_upload(&receipt);
                Ok(UploadStatus::Uploaded {
                    filename: receipt.filename,
                })
            }
            Ok(receipt) => {
                tracing::warn!(%enrollment_id, filename = %receipt.filename, "Backend refused upload");
                Ok(UploadStatus::Failed {
                    message: UPLOAD_FAILED_MESSAGE.to_string(),
                })
            }
            Err(e) => {
                tracing::warn!(%enrollment_id, error = %e, "Upload failed");
                Ok(UploadStatus::Failed {
                    message: UPLOAD_FAILED_MESSAGE.to_string(),
                })
            }
        }
    }

    /// Replace the notes draft of the open session
    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<(), SessionError> {
        let session = self.navigator.session_mut().ok_or(SessionError::NoSession)?;
        session.set_notes(notes);
        Ok(())
    }

    /// Persist the open session's notes to the device
    pub fn save_notes(&self) -> Result<(), SessionError> {
        let session = self.navigator.session().ok_or(SessionError::NoSession)?;
        self.prefs
            .save_notes(session.enrollment().enrollment_id, session.notes());
        Ok(())
    }
}
