//! HTTP implementation of the tutoring backend

use super::{
    BackendError, ChatReply, ChatRequest, EnrollmentId, EnrollmentRef, FileUpload, TutorBackend,
    UploadReceipt,
};
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// Talks to the backend's REST API
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| BackendError::unavailable(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::unavailable(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(BackendError::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            BackendError::invalid_response(format!("Failed to parse response: {e} - body: {body}"))
        })
    }
}

#[async_trait]
impl TutorBackend for HttpBackend {
    async fn list_enrollments(&self) -> Result<Vec<EnrollmentRef>, BackendError> {
        let response = self.client.get(self.endpoint("enrollments")).send().await?;
        Self::decode(response).await
    }

    async fn send_chat(
        &self,
        enrollment_id: EnrollmentId,
        text: &str,
    ) -> Result<ChatReply, BackendError> {
        let response = self
            .client
            .post(self.endpoint("chat"))
            .json(&ChatRequest {
                enrollment_id,
                message: text,
            })
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn upload_file(
        &self,
        enrollment_id: EnrollmentId,
        file: FileUpload,
    ) -> Result<UploadReceipt, BackendError> {
        let part = Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(&file.content_type)
            .map_err(|e| BackendError::rejected(format!("Invalid content type: {e}")))?;
        let form = Form::new()
            .text("enrollment_id", enrollment_id.to_string())
            .part("file", part);

        let response = self
            .client
            .post(self.endpoint("uploads"))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }
}
