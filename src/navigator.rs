//! Route and active-session ownership
//!
//! The client is either on the welcome screen picking an enrollment, or inside
//! one enrollment's workspace. The navigator owns the only live [`Session`].

use crate::backend::EnrollmentRef;
use crate::session::{Session, SessionError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    #[default]
    Welcome,
    Workspace { session_id: String },
}

#[derive(Default)]
pub struct Navigator {
    route: Route,
    session: Option<Session>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Open the workspace for an enrollment
    ///
    /// Reselecting the enrollment that is already open returns the existing
    /// session untouched. Selecting a different one while a session is open
    /// fails with [`SessionError::AlreadyActive`]; call
    /// [`Self::leave_workspace`] first.
    pub fn select_enrollment(
        &mut self,
        enrollment: EnrollmentRef,
        notes: String,
    ) -> Result<&mut Session, SessionError> {
        let active_id = self.session.as_ref().map(|s| s.enrollment().enrollment_id);
        match active_id {
            Some(active) if active != enrollment.enrollment_id => {
                return Err(SessionError::AlreadyActive {
                    active,
                    requested: enrollment.enrollment_id,
                });
            }
            Some(_) => {}
            None => {
                let session = Session::start(enrollment, notes);
                self.route = Route::Workspace {
                    session_id: session.id().to_string(),
                };
                self.session = Some(session);
            }
        }
        self.session.as_mut().ok_or(SessionError::NoSession)
    }

    /// Tear down the open session and go back to the welcome screen
    ///
    /// An in-flight request is dropped with the session; a late completion
    /// has nowhere to land.
    pub fn leave_workspace(&mut self) -> Option<Session> {
        self.route = Route::Welcome;
        let session = self.session.take();
        if let Some(session) = &session {
            if session.current_request_state().is_pending() {
                tracing::info!(session_id = %session.id(), "Leaving workspace with a request in flight");
            }
        }
        session
    }
}

/// Pick which enrollment the welcome screen preselects
///
/// The stored id wins when it is still in the list; otherwise the first
/// enrollment; `None` for an empty list.
pub fn preferred_enrollment<'a>(
    enrollments: &'a [EnrollmentRef],
    stored_id: Option<&str>,
) -> Option<&'a EnrollmentRef> {
    stored_id
        .map(str::trim)
        .and_then(|stored| {
            enrollments
                .iter()
                .find(|e| e.enrollment_id.to_string() == stored)
        })
        .or_else(|| enrollments.first())
}
