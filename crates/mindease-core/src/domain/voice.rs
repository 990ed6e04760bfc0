//! Synthesis voice metadata and utterance shape.

use serde::{Deserialize, Serialize};

use super::LanguageCode;

/// One entry of the synthesis engine's voice catalog.
///
/// The engine owns the voice; the controller only keeps a copy of this
/// handle and re-validates it whenever the catalog refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceHandle {
    /// Engine-unique identifier (a voice URI on web engines).
    pub id: String,

    /// Human-readable name, e.g. `"Google UK English Female"`.
    pub name: String,

    /// BCP-47 language tag reported by the engine, e.g. `"en-GB"`.
    pub lang: String,
}

impl VoiceHandle {
    /// Build a handle whose id equals its name.
    pub fn named(name: impl Into<String>, lang: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            lang: lang.into(),
        }
    }
}

/// A fully-prepared request for the synthesis engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utterance {
    /// Speech-safe text (already normalized).
    pub text: String,

    /// Voice to use; `None` lets the engine pick its default.
    pub voice: Option<VoiceHandle>,

    /// Speaking rate multiplier (1.0 = engine normal).
    pub rate: f32,

    /// Pitch (1.0 = neutral).
    pub pitch: f32,

    /// Volume (0.0–1.0).
    pub volume: f32,

    /// Language the text is written in.
    pub lang: LanguageCode,
}
