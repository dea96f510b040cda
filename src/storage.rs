//! Device-local key-value persistence
//!
//! Notes and the last selected enrollment live on the learner's device. All
//! access goes through [`Preferences`], which owns key naming and swallows
//! storage failures: a blocked or broken store costs the learner their notes,
//! never a crash.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::backend::EnrollmentId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key holding the id of the enrollment picked last
pub const LAST_ENROLLMENT_KEY: &str = "homegrown:last_enrollment_id";

/// Key holding the notes written for one enrollment
pub fn notes_key(enrollment_id: EnrollmentId) -> String {
    format!("homegrown:notes:{enrollment_id}")
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A string key-value store on the device
pub trait DeviceStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

impl<T: DeviceStore + ?Sized> DeviceStore for Arc<T> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }
}

/// Process-memory store, used when no file store can be opened
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Best-effort access to device-local preferences and notes
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn DeviceStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn DeviceStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Raw stored id of the last selected enrollment
    pub fn last_enrollment_id(&self) -> Option<String> {
        self.get(LAST_ENROLLMENT_KEY)
    }

    pub fn remember_enrollment(&self, enrollment_id: EnrollmentId) {
        self.set(LAST_ENROLLMENT_KEY, &enrollment_id.to_string());
    }

    /// Saved notes for an enrollment, empty when none
    pub fn notes(&self, enrollment_id: EnrollmentId) -> String {
        self.get(&notes_key(enrollment_id)).unwrap_or_default()
    }

    pub fn save_notes(&self, enrollment_id: EnrollmentId, notes: &str) {
        self.set(&notes_key(enrollment_id), notes);
    }

    fn get(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Device storage read failed");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(key, error = %e, "Device storage write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store that fails every call, like blocked browser storage
    struct BrokenStore;

    impl DeviceStore for BrokenStore {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "storage blocked",
            )))
        }

        fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Poisoned)
        }
    }

    #[test]
    fn test_key_naming() {
        assert_eq!(notes_key(EnrollmentId(7)), "homegrown:notes:7");
        assert_eq!(LAST_ENROLLMENT_KEY, "homegrown:last_enrollment_id");
    }

    #[test]
    fn test_notes_are_per_enrollment() {
        let prefs = Preferences::in_memory();
        prefs.save_notes(EnrollmentId(1), "APR is yearly");

        assert_eq!(prefs.notes(EnrollmentId(1)), "APR is yearly");
        assert_eq!(prefs.notes(EnrollmentId(2)), "");
    }

    #[test]
    fn test_last_enrollment_round_trip() {
        let prefs = Preferences::in_memory();
        assert_eq!(prefs.last_enrollment_id(), None);

        prefs.remember_enrollment(EnrollmentId(7));
        prefs.remember_enrollment(EnrollmentId(9));
        assert_eq!(prefs.last_enrollment_id().as_deref(), Some("9"));
    }

    #[test]
    fn test_failures_are_swallowed() {
        let prefs = Preferences::new(Arc::new(BrokenStore));

        prefs.remember_enrollment(EnrollmentId(7));
        prefs.save_notes(EnrollmentId(7), "lost");

        assert_eq!(prefs.last_enrollment_id(), None);
        assert_eq!(prefs.notes(EnrollmentId(7)), "");
    }

    #[test]
    fn test_clones_share_the_store() {
        let prefs = Preferences::in_memory();
        let other = prefs.clone();
        other.save_notes(EnrollmentId(3), "shared");
        assert_eq!(prefs.notes(EnrollmentId(3)), "shared");
    }
}
