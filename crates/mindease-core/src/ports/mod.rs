//! Port definitions (trait abstractions) for the voice controller's collaborators.
//!
//! Ports define the interfaces that the controller expects from the runtime
//! and the surrounding chat client. They contain no implementation details.
//!
//! # Design Rules
//!
//! - Engine ports are fire-and-forget: outcomes come back as events
//! - Every engine call is tagged with an [`AttemptId`](crate::AttemptId)
//! - No async in signatures; the controller is a synchronous event consumer

pub mod chat;
pub mod feedback;
pub mod preferences;
pub mod recognition;
pub mod synthesis;
pub mod timer;

use std::sync::Arc;
use thiserror::Error;

pub use chat::ChatPort;
pub use feedback::{FeedbackSink, Indicator, Severity, TracingFeedback};
pub use preferences::{InMemoryPreferenceStore, PreferenceError, PreferenceStore};
pub use recognition::{RecognitionErrorKind, RecognitionEvent, SpeechRecognizer};
pub use synthesis::{SpeechEvent, SpeechSynthesizer};
pub use timer::TimerPort;

/// Errors an engine can return synchronously from `start`/`speak`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The runtime does not provide this engine.
    #[error("Engine unavailable")]
    Unavailable,

    /// The engine refused the request (already running, bad state, …).
    #[error("Engine rejected request: {0}")]
    Rejected(String),
}

/// Container for every collaborator the controller needs.
///
/// Engine and timer ports are owned (the controller is their only caller);
/// the preference store, feedback sink and chat are shared with the host.
pub struct VoicePorts {
    /// Speech-to-text engine.
    pub recognizer: Box<dyn SpeechRecognizer>,
    /// Text-to-speech engine.
    pub synthesizer: Box<dyn SpeechSynthesizer>,
    /// Timer scheduling back into the controller's queue.
    pub timers: Box<dyn TimerPort>,
    /// Persistent preferences.
    pub preferences: Arc<dyn PreferenceStore>,
    /// Notifications and indicators.
    pub feedback: Arc<dyn FeedbackSink>,
    /// Chat input and send.
    pub chat: Arc<dyn ChatPort>,
}
