#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;
#[cfg(feature = "test-utils")]
pub mod testing;

// Re-export commonly used types for convenience
pub use domain::{AttemptId, LanguageCode, TimerToken, UnknownLanguage, Utterance, VoiceHandle};
pub use ports::{
    ChatPort, EngineError, FeedbackSink, InMemoryPreferenceStore, Indicator, PreferenceError,
    PreferenceStore, RecognitionErrorKind, RecognitionEvent, Severity, SpeechEvent,
    SpeechRecognizer, SpeechSynthesizer, TimerPort, TracingFeedback, VoicePorts,
};
