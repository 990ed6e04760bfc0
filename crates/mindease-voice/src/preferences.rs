//! Voice preference persistence.
//!
//! [`VoicePreferences`] reads and writes the two voice settings through any
//! [`PreferenceStore`]. Storage problems never interrupt a transition: reads
//! fall back to defaults and failed writes are logged.
//!
//! [`JsonFilePreferenceStore`] is the file-backed store used by the CLI.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use mindease_core::{LanguageCode, PreferenceError, PreferenceStore};

use crate::error::VoiceError;

/// Key of the persisted voice-mode flag (`"true"` / `"false"`).
pub const ENABLED_KEY: &str = "mindease_voice_enabled";

/// Key of the persisted language code.
pub const LANGUAGE_KEY: &str = "mindease_voice_language";

/// Preference values as loaded at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoredPreferences {
    pub enabled: bool,
    /// `None` when no language was ever saved.
    pub language: Option<LanguageCode>,
}

/// Typed view over the two voice preference keys.
#[derive(Clone)]
pub struct VoicePreferences {
    store: Arc<dyn PreferenceStore>,
}

impl VoicePreferences {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Load both preferences. Never fails.
    pub fn load(&self) -> StoredPreferences {
        let enabled = self
            .read(ENABLED_KEY)
            .is_some_and(|value| value.trim() == "true");
        let language = self
            .read(LANGUAGE_KEY)
            .map(|code| LanguageCode::from_code_or_auto(&code));

        StoredPreferences { enabled, language }
    }

    pub fn save_enabled(&self, enabled: bool) {
        self.write(ENABLED_KEY, if enabled { "true" } else { "false" });
    }

    pub fn save_language(&self, language: LanguageCode) {
        self.write(LANGUAGE_KEY, language.code());
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read voice preference, using default");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(key, value, error = %e, "Failed to save voice preference");
        }
    }
}

// ── JSON file store ────────────────────────────────────────────────

/// Preference store persisted as a flat JSON object of strings.
///
/// The file is read once on open; every `set` rewrites it.
#[derive(Debug)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFilePreferenceStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file is an empty store. A file that exists but is not a
    /// JSON object of strings is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, VoiceError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), entries = values.len(), "Opened preference file");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// `<data dir>/mindease/voice-preferences.json`, or a relative file when
    /// the platform has no data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir().map_or_else(
            || PathBuf::from("voice-preferences.json"),
            |dir| dir.join("mindease").join("voice-preferences.json"),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), PreferenceError> {
        let json = serde_json::to_string_pretty(values)
            .map_err(|e| PreferenceError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PreferenceError::Storage(e.to_string()))?;
        }
        fs::write(&self.path, json).map_err(|e| PreferenceError::Storage(e.to_string()))
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
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
        self.persist(&values)
    }
}
