//! Wire types exchanged with the tutoring backend

use crate::workspace::WorkspaceUpdate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

/// Opaque enrollment identifier assigned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrollmentId(pub i64);

impl fmt::Display for EnrollmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One enrollment as listed by `GET /enrollments`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRef {
    pub enrollment_id: EnrollmentId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub course_title: String,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub current_module_index: Option<u32>,
    #[serde(default)]
    pub total_modules: Option<u32>,
    #[serde(default)]
    pub current_module_title: Option<String>,
    #[serde(default)]
    pub current_module_objective: Option<String>,
}

impl EnrollmentRef {
    pub fn new(enrollment_id: EnrollmentId, course_title: impl Into<String>) -> Self {
        Self {
            enrollment_id,
            course_title: course_title.into(),
            agent_name: None,
            current_module_index: None,
            total_modules: None,
            current_module_title: None,
            current_module_objective: None,
        }
    }

    /// Label for an enrollment picker, e.g. `Finance 101 — Tera`
    pub fn option_label(&self) -> String {
        let title = if self.course_title.is_empty() {
            "Untitled Course"
        } else {
            &self.course_title
        };
        match self.agent_name.as_deref() {
            Some(agent) if !agent.is_empty() => format!("{title} — {agent}"),
            _ => title.to_string(),
        }
    }

    /// Secondary line under a picker entry, e.g. `Tera • Module 2 / 3`
    pub fn detail_label(&self) -> String {
        let mut label = match self.agent_name.as_deref() {
            Some(agent) if !agent.is_empty() => format!("{agent} • "),
            _ => String::new(),
        };
        match self.current_module_index {
            Some(index) => label.push_str(&format!("Module {}", u64::from(index) + 1)),
            None => label.push_str("Module ?"),
        }
        if let Some(total) = self.total_modules {
            label.push_str(&format!(" / {total}"));
        }
        label
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub enrollment_id: EnrollmentId,
    pub message: &'a str,
}

/// Response of `POST /chat`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub agent_response: String,
    #[serde(default)]
    pub workspace_update: Option<WorkspaceUpdate>,
}

/// A file to send to `POST /uploads`
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string();
        Self {
            filename,
            content_type,
            bytes,
        }
    }

    /// Read a file from disk, naming the upload after its final path component
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().to_string());
        Ok(Self::new(filename, bytes))
    }
}

/// Response of `POST /uploads`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub ok: bool,
    pub filename: String,
    #[serde(default)]
    pub stored_name: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrollment_listing_decodes() {
        let json = r#"[
            {"enrollment_id": 7, "course_id": 2, "course_title": "Finance 101",
             "agent_name": "Tera", "current_module_index": 0, "total_modules": 3,
             "current_module_title": "Budgeting", "current_module_objective": "Make a budget"},
            {"enrollment_id": 8, "course_id": null, "course_title": null,
             "agent_name": null, "current_module_index": 0, "total_modules": null,
             "current_module_title": null, "current_module_objective": null}
        ]"#;
        let list: Vec<EnrollmentRef> = serde_json::from_str(json).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].enrollment_id, EnrollmentId(7));
        assert_eq!(list[0].agent_name.as_deref(), Some("Tera"));
        assert_eq!(list[0].total_modules, Some(3));
        assert_eq!(list[1].course_title, "");
        assert_eq!(list[1].total_modules, None);
    }

    #[test]
    fn test_option_label() {
        let mut enrollment = EnrollmentRef::new(EnrollmentId(1), "Finance 101");
        assert_eq!(enrollment.option_label(), "Finance 101");

        enrollment.agent_name = Some("Tera".to_string());
        assert_eq!(enrollment.option_label(), "Finance 101 — Tera");

        enrollment.course_title = String::new();
        assert_eq!(enrollment.option_label(), "Untitled Course — Tera");
    }

    #[test]
    fn test_detail_label() {
        let mut enrollment = EnrollmentRef::new(EnrollmentId(1), "Finance 101");
        assert_eq!(enrollment.detail_label(), "Module ?");

        enrollment.total_modules = Some(3);
        assert_eq!(enrollment.detail_label(), "Module ? / 3");

        enrollment.agent_name = Some("Tera".to_string());
        enrollment.current_module_index = Some(1);
        assert_eq!(enrollment.detail_label(), "Tera • Module 2 / 3");

        enrollment.total_modules = None;
        enrollment.agent_name = Some(String::new());
        assert_eq!(enrollment.detail_label(), "Module 2");
    }

    #[test]
    fn test_chat_reply_decodes() {
        let reply: ChatReply = serde_json::from_str(
            r#"{"agent_response": "Nice work!", "workspace_update": {"status": "unlocked", "next_module": "Taxes", "objective": "File a return"}}"#,
        )
        .unwrap();
        assert_eq!(reply.agent_response, "Nice work!");
        let update = reply.workspace_update.unwrap();
        assert_eq!(update.next_module.as_deref(), Some("Taxes"));

        let bare: ChatReply =
            serde_json::from_str(r#"{"agent_response": null, "workspace_update": null}"#).unwrap();
        assert_eq!(bare, ChatReply::default());
    }

    #[test]
    fn test_chat_request_encodes() {
        let body = serde_json::to_value(ChatRequest {
            enrollment_id: EnrollmentId(7),
            message: "Hello Tera",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"enrollment_id": 7, "message": "Hello Tera"})
        );
    }

    #[test]
    fn test_file_upload_guesses_content_type() {
        assert_eq!(FileUpload::new("budget.csv", vec![]).content_type, "text/csv");
        assert_eq!(
            FileUpload::new("mystery", vec![1, 2]).content_type,
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_file_upload_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("essay.txt");
        std::fs::write(&path, b"my essay").unwrap();

        let upload = FileUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.filename, "essay.txt");
        assert_eq!(upload.content_type, "text/plain");
        assert_eq!(upload.bytes, b"my essay");
    }
}
