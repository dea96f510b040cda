//! Tutoring backend abstraction
//!
//! The backend owns tutoring, grading and enrollment records. The client only
//! needs the three calls on [`TutorBackend`].

mod error;
mod http;
mod types;

#[cfg(test)]
pub mod testing;

pub use error::{BackendError, BackendErrorKind};
pub use http::HttpBackend;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Remote service the session talks to
#[async_trait]
pub trait TutorBackend: Send + Sync {
    /// List the learner's enrollments
    async fn list_enrollments(&self) -> Result<Vec<EnrollmentRef>, BackendError>;

    /// Send a chat message and wait for the tutor's reply
    async fn send_chat(
        &self,
        enrollment_id: EnrollmentId,
        text: &str,
    ) -> Result<ChatReply, BackendError>;

    /// Upload a file for grading
    async fn upload_file(
        &self,
        enrollment_id: EnrollmentId,
        file: FileUpload,
    ) -> Result<UploadReceipt, BackendError>;
}

#[async_trait]
impl<T: TutorBackend + ?Sized> TutorBackend for Arc<T> {
    async fn list_enrollments(&self) -> Result<Vec<EnrollmentRef>, BackendError> {
        (**self).list_enrollments().await
    }

    async fn send_chat(
        &self,
        enrollment_id: EnrollmentId,
        text: &str,
    ) -> Result<ChatReply, BackendError> {
        (**self).send_chat(enrollment_id, text).await
    }

    async fn upload_file(
        &self,
        enrollment_id: EnrollmentId,
        file: FileUpload,
    ) -> Result<UploadReceipt, BackendError> {
        (**self).upload_file(enrollment_id, file).await
    }
}

/// Logging wrapper for a backend
pub struct LoggingBackend<B> {
    inner: B,
}

impl<B: TutorBackend> LoggingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    fn log_failure(call: &str, duration: std::time::Duration, e: &BackendError) {
        tracing::error!(
            call,
            duration_ms = %duration.as_millis(),
            kind = ?e.kind,
            error = %e.message,
            "Backend request failed"
        );
    }
}

#[async_trait]
impl<B: TutorBackend> TutorBackend for LoggingBackend<B> {
    async fn list_enrollments(&self) -> Result<Vec<EnrollmentRef>, BackendError> {
        let start = std::time::Instant::now();
        let result = self.inner.list_enrollments().await;
        match &result {
            Ok(list) => tracing::info!(
                duration_ms = %start.elapsed().as_millis(),
                count = list.len(),
                "Enrollments loaded"
            ),
            Err(e) => Self::log_failure("list_enrollments", start.elapsed(), e),
        }
        result
    }

    async fn send_chat(
        &self,
        enrollment_id: EnrollmentId,
        text: &str,
    ) -> Result<ChatReply, BackendError> {
        let start = std::time::Instant::now();
        let result = self.inner.send_chat(enrollment_id, text).await;
        match &result {
            Ok(reply) => tracing::info!(
                %enrollment_id,
                duration_ms = %start.elapsed().as_millis(),
                has_workspace_update = reply.workspace_update.is_some(),
                "Chat reply received"
            ),
            Err(e) => Self::log_failure("send_chat", start.elapsed(), e),
        }
        result
    }

    async fn upload_file(
        &self,
        enrollment_id: EnrollmentId,
        file: FileUpload,
    ) -> Result<UploadReceipt, BackendError> {
        let start = std::time::Instant::now();
        let size = file.bytes.len();
        let result = self.inner.upload_file(enrollment_id, file).await;
        match &result {
            Ok(receipt) => tracing::info!(
                %enrollment_id,
                duration_ms = %start.elapsed().as_millis(),
                filename = %receipt.filename,
                size,
                "File uploaded"
            ),
            Err(e) => Self::log_failure("upload_file", start.elapsed(), e),
        }
        result
    }
}
