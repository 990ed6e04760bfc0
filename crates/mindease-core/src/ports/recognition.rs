//! Speech-to-text engine port.
//!
//! Recognition engines in this domain are single-shot: one `start` call
//! yields at most one utterance. The controller re-arms the engine itself
//! to keep a conversation going.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::EngineError;
use crate::domain::AttemptId;

/// Speech-to-text capability supplied by the runtime.
///
/// `start` and `stop` return immediately. Outcomes arrive later as
/// [`RecognitionEvent`]s tagged with the attempt id passed to `start`.
pub trait SpeechRecognizer: Send {
    /// Whether the runtime exposes a recognition engine at all.
    fn is_available(&self) -> bool;

    /// Begin listening for one utterance in `language_tag` (e.g. `"hi-IN"`).
    fn start(&mut self, attempt: AttemptId, language_tag: &str) -> Result<(), EngineError>;

    /// Ask the engine to stop the current attempt.
    ///
    /// Must be safe to call when nothing is running.
    fn stop(&mut self);
}

/// Callback emitted by a recognition engine for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// The microphone opened.
    Started,

    /// A transcript delta; zero or more interim results precede one final.
    Result { transcript: String, is_final: bool },

    /// The engine reported a failure.
    Error(RecognitionErrorKind),

    /// The engine closed the attempt.
    Ended,
}

/// Error kinds reported by recognition engines.
///
/// String forms match the web speech error codes (`"no-speech"`, …).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecognitionErrorKind {
    NoSpeech,
    Aborted,
    AudioCapture,
    Network,
    NotAllowed,
    ServiceNotAllowed,
    BadGrammar,
    LanguageNotSupported,
    /// Any code the engine reports that is not listed above.
    Other(String),
}

impl RecognitionErrorKind {
    /// Engine code for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoSpeech => "no-speech",
            Self::Aborted => "aborted",
            Self::AudioCapture => "audio-capture",
            Self::Network => "network",
            Self::NotAllowed => "not-allowed",
            Self::ServiceNotAllowed => "service-not-allowed",
            Self::BadGrammar => "bad-grammar",
            Self::LanguageNotSupported => "language-not-supported",
            Self::Other(code) => code,
        }
    }
}

impl From<&str> for RecognitionErrorKind {
    fn from(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "bad-grammar" => Self::BadGrammar,
            "language-not-supported" => Self::LanguageNotSupported,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_codes_round_trip() {
        for code in ["no-speech", "aborted", "not-allowed", "language-not-supported"] {
            assert_eq!(RecognitionErrorKind::from(code).as_str(), code);
        }
    }

    #[test]
    fn unknown_code_is_preserved() {
        let kind = RecognitionErrorKind::from("phasers");
        assert_eq!(kind, RecognitionErrorKind::Other("phasers".to_string()));
        assert_eq!(kind.to_string(), "phasers");
    }
}
