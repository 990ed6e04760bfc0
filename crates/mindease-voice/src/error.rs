//! Voice controller error types.

use mindease_core::{EngineError, PreferenceError, RecognitionErrorKind};

/// Engine capability the runtime may lack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Recognition,
    Synthesis,
}

/// Errors that can occur in the voice controller.
///
/// None of these escape [`VoiceController::handle`](crate::VoiceController::handle):
/// they are reported through the feedback sink using [`VoiceError::user_message`].
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// Speech recognition or synthesis is missing from the runtime.
    #[error("{0:?} capability unavailable")]
    CapabilityUnavailable(Capability),

    /// Microphone or speech service blocked by the user or platform.
    #[error("Microphone permission denied ({0})")]
    PermissionDenied(RecognitionErrorKind),

    /// Transient recognition failure; the controller retries.
    #[error("Transient recognition failure: {0}")]
    Retryable(RecognitionErrorKind),

    /// Recognition failure that ends voice mode for the session.
    #[error("Recognition failed: {0}")]
    RecognitionFailed(RecognitionErrorKind),

    /// Final transcript shorter than the configured minimum.
    #[error("Transcript too short ({len} < {min} characters)")]
    TranscriptTooShort { len: usize, min: usize },

    /// Speech synthesis failed.
    #[error("Speech playback failed: {0}")]
    PlaybackError(String),

    /// Engine refused a start/speak request.
    #[error("Engine start failed: {0}")]
    EngineStart(#[from] EngineError),

    /// Preference store failure.
    #[error("Preference store error: {0}")]
    Preferences(#[from] PreferenceError),

    /// IO error (preference file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Preference file or config could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration failed validation.
    #[error("Invalid voice config: {0}")]
    InvalidConfig(String),
}

impl VoiceError {
    /// Human-readable message for the notification toast.
    pub fn user_message(&self) -> String {
        match self {
            Self::CapabilityUnavailable(Capability::Recognition) => {
                "Speech recognition not supported in this browser".to_string()
            }
            Self::CapabilityUnavailable(Capability::Synthesis) => {
                "Text-to-speech not supported in this browser".to_string()
            }
            Self::PermissionDenied(kind)
            | Self::Retryable(kind)
            | Self::RecognitionFailed(kind) => recognition_message(kind),
            Self::TranscriptTooShort { .. } => "Message too short. Please try again.".to_string(),
            Self::PlaybackError(_) => "Speech playback error".to_string(),
            Self::EngineStart(_) => "Failed to start voice recognition".to_string(),
            Self::Preferences(_) | Self::Io(_) | Self::Serialization(_) => {
                "Voice settings could not be read or saved".to_string()
            }
            Self::InvalidConfig(reason) => format!("Voice configuration error: {reason}"),
        }
    }
}

/// Message shown for a recognition engine error kind.
pub fn recognition_message(kind: &RecognitionErrorKind) -> String {
    let fixed = match kind {
        RecognitionErrorKind::NoSpeech => "No speech detected. Please try again.",
        RecognitionErrorKind::AudioCapture => {
            "Microphone access denied. Please allow microphone access."
        }
        RecognitionErrorKind::NotAllowed => {
            "Microphone access not allowed. Please check permissions."
        }
        RecognitionErrorKind::Network => "Network error. Please check your connection.",
        RecognitionErrorKind::ServiceNotAllowed => {
            "Speech service not allowed. Please try again."
        }
        RecognitionErrorKind::BadGrammar => "Speech not recognized. Please speak clearly.",
        RecognitionErrorKind::LanguageNotSupported => {
            "Language not supported. Switching to English."
        }
        RecognitionErrorKind::Aborted | RecognitionErrorKind::Other(_) => {
            return format!("Voice recognition error: {kind}");
        }
    };
    fixed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_kinds_have_fixed_messages() {
        assert_eq!(
            recognition_message(&RecognitionErrorKind::NoSpeech),
            "No speech detected. Please try again."
        );
    }

    #[test]
    fn unknown_kind_names_the_code() {
        let kind = RecognitionErrorKind::Other("overheated".to_string());
        assert_eq!(
            recognition_message(&kind),
            "Voice recognition error: overheated"
        );
    }

    #[test]
    fn too_short_message() {
        let err = VoiceError::TranscriptTooShort { len: 2, min: 3 };
        assert_eq!(err.user_message(), "Message too short. Please try again.");
        assert_eq!(err.to_string(), "Transcript too short (2 < 3 characters)");
    }
}
