//! Persistent key-value preference store port.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

/// Errors from a preference store backend.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Backend storage failed (disk, quota, etc.).
    #[error("Preference storage error: {0}")]
    Storage(String),

    /// Stored data could not be decoded.
    #[error("Preference serialization error: {0}")]
    Serialization(String),
}

/// String-keyed persistent store for user preferences.
///
/// Implementations must be cheap to call from the controller's event loop.
pub trait PreferenceStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Process-local preference store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store.
    #[must_use]
    pub fn with(self, key: &str, value: &str) -> Self {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        self
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let values = self
            .values
            .lock()
            .map_err(|e| PreferenceError::Storage(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| PreferenceError::Storage(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
