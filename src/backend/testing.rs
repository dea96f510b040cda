//! Mock backend for testing
//!
//! Lets session and runtime tests run without a real server.

use super::*;
use crate::workspace::WorkspaceUpdate;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock backend that returns queued responses
pub struct MockBackend {
    enrollments: Mutex<Result<Vec<EnrollmentRef>, BackendError>>,
    chat_replies: Mutex<VecDeque<Result<ChatReply, BackendError>>>,
    upload_results: Mutex<VecDeque<Result<UploadReceipt, BackendError>>>,
    chats: Mutex<Vec<(EnrollmentId, String)>>,
    /// (enrollment, filename, size)
    uploads: Mutex<Vec<(EnrollmentId, String, usize)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            enrollments: Mutex::new(Ok(Vec::new())),
            chat_replies: Mutex::new(VecDeque::new()),
            upload_results: Mutex::new(VecDeque::new()),
            chats: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_enrollments(self, enrollments: Vec<EnrollmentRef>) -> Self {
        *self.enrollments.lock().unwrap() = Ok(enrollments);
        self
    }

    pub fn fail_enrollments(self, error: BackendError) -> Self {
        *self.enrollments.lock().unwrap() = Err(error);
        self
    }

    /// Queue a successful chat reply
    pub fn queue_reply(&self, text: &str, workspace_update: Option<WorkspaceUpdate>) {
        self.chat_replies.lock().unwrap().push_back(Ok(ChatReply {
            agent_response: text.to_string(),
            workspace_update,
        }));
    }

    /// Queue a chat failure
    pub fn queue_chat_error(&self, error: BackendError) {
        self.chat_replies.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_upload(&self, result: Result<UploadReceipt, BackendError>) {
        self.upload_results.lock().unwrap().push_back(result);
    }

    pub fn recorded_chats(&self) -> Vec<(EnrollmentId, String)> {
        self.chats.lock().unwrap().clone()
    }

    pub fn recorded_uploads(&self) -> Vec<(EnrollmentId, String, usize)> {
        self.uploads.lock().unwrap().clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TutorBackend for MockBackend {
    async fn list_enrollments(&self) -> Result<Vec<EnrollmentRef>, BackendError> {
        self.enrollments.lock().unwrap().clone()
    }

    async fn send_chat(
        &self,
        enrollment_id: EnrollmentId,
        text: &str,
    ) -> Result<ChatReply, BackendError> {
        self.chats
            .lock()
            .unwrap()
            .push((enrollment_id, text.to_string()));
        self.chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::unavailable("No mock reply queued")))
    }

    async fn upload_file(
        &self,
        enrollment_id: EnrollmentId,
        file: FileUpload,
    ) -> Result<UploadReceipt, BackendError> {
        self.uploads
            .lock()
            .unwrap()
            .push((enrollment_id, file.filename.clone(), file.bytes.len()));
        self.upload_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(UploadReceipt {
                    ok: true,
                    filename: file.filename,
                    stored_name: None,
                    bytes: Some(file.bytes.len() as u64),
                })
            })
    }
}
