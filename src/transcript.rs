//! Append-only chat transcript

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The learner using this client
    Local,
    /// The remote tutor agent
    Remote,
    /// The client itself (connection errors, upload log lines)
    System,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::Local => write!(f, "local"),
            Sender::Remote => write!(f, "remote"),
            Sender::System => write!(f, "system"),
        }
    }
}

/// One line of the chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub sender: Sender,
    pub text: String,
    /// Position in the transcript, starting at 1
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
}

/// Ordered log of chat entries
///
/// Entries are never removed, reordered or edited. Readers only ever see
/// shared references or owned copies.
#[derive(Debug, Clone, Default)]
pub struct TranscriptStore {
    entries: Vec<TranscriptEntry>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, assigning it the next sequence number
    pub fn append(&mut self, sender: Sender, text: impl Into<String>) -> &TranscriptEntry {
        let sequence = self.entries.last().map_or(1, |last| last.sequence + 1);
        self.entries.push(TranscriptEntry {
            sender,
            text: text.into(),
            sequence,
            created_at: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Iterate over all entries in order
    pub fn iter(&self) -> impl Iterator<Item = &TranscriptEntry> + '_ {
        self.entries.iter()
    }

    /// Owned copy of every entry in order
    pub fn list(&self) -> Vec<TranscriptEntry> {
        self.entries.clone()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
