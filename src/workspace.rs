//! Workspace snapshot and server-driven module progress
//!
//! The snapshot is the learner's current position in the course. It only
//! changes by folding a [`WorkspaceUpdate`] into it with [`merge`], which
//! never mutates the prior value.

use crate::backend::EnrollmentRef;
use serde::{Deserialize, Serialize};

/// Title shown before the backend has told us anything about the module
pub const DEFAULT_TITLE: &str = "Current Module";

/// Objective shown before the backend has told us anything about the module
pub const DEFAULT_OBJECTIVE: &str = "Objective will appear here.";

/// Status every freshly opened workspace starts in
pub const DEFAULT_STATUS: &str = "In Progress";

/// The learner's current module as shown in the workspace panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    pub title: String,
    pub objective: String,
    pub status: String,
    /// Zero-based index of the current module
    pub module_index: Option<u32>,
    pub total_modules: Option<u32>,
}

impl WorkspaceSnapshot {
    /// Seed a snapshot from the enrollment the session was opened for
    pub fn from_enrollment(enrollment: &EnrollmentRef) -> Self {
        Self {
            title: non_empty_or(enrollment.current_module_title.as_deref(), DEFAULT_TITLE),
            objective: non_empty_or(
                enrollment.current_module_objective.as_deref(),
                DEFAULT_OBJECTIVE,
            ),
            status: DEFAULT_STATUS.to_string(),
            module_index: Some(enrollment.current_module_index.unwrap_or(0)),
            total_modules: enrollment.total_modules,
        }
    }

    /// Human-readable progress line, e.g. `Module 2 / 5 • In Progress`
    ///
    /// Parts whose data is missing are left out.
    pub fn progress_label(&self) -> String {
        let mut label = String::new();
        if let Some(index) = self.module_index {
            label.push_str(&format!("Module {}", u64::from(index) + 1));
        }
        if let Some(total) = self.total_modules {
            label.push_str(&format!(" / {total}"));
        }
        if !self.status.is_empty() {
            if !label.is_empty() {
                label.push_str(" • ");
            }
            label.push_str(&self.status);
        }
        label
    }
}

/// Partial workspace record sent by the backend alongside a chat reply
///
/// Any field may be absent. Unknown fields are ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Title of the module the learner just advanced to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
}

impl WorkspaceUpdate {
    /// An update carrying nothing
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.next_module.is_none() && self.objective.is_none()
    }

    /// Whether the update signals a move to the next module
    pub fn advances_module(&self) -> bool {
        self.next_module.is_some()
    }
}

/// Fold an update into a snapshot, returning the new snapshot
///
/// Present, non-empty fields overwrite; everything else is kept. A
/// `next_module` field (even an empty one) bumps a defined module index by
/// exactly one. `total_modules` is never touched.
pub fn merge(current: &WorkspaceSnapshot, update: &WorkspaceUpdate) -> WorkspaceSnapshot {
    let module_index = if update.advances_module() {
        current.module_index.map(|index| index.saturating_add(1))
    } else {
        current.module_index
    };

    WorkspaceSnapshot {
        title: non_empty_or(update.next_module.as_deref(), &current.title),
        objective: non_empty_or(update.objective.as_deref(), &current.objective),
        status: non_empty_or(update.status.as_deref(), &current.status),
        module_index,
        total_modules: current.total_modules,
    }
}

fn non_empty_or(candidate: Option<&str>, fallback: &str) -> String {
    match candidate {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => fallback.to_string(),
    }
}
