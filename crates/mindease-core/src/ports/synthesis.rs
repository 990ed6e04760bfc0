//! Text-to-speech engine port.

use super::EngineError;
use crate::domain::{AttemptId, Utterance, VoiceHandle};

/// Text-to-speech capability supplied by the runtime.
///
/// `speak` queues playback and returns immediately; completion is reported
/// through [`SpeechEvent`]s tagged with the attempt id.
pub trait SpeechSynthesizer: Send {
    /// Whether the runtime exposes a synthesis engine at all.
    fn is_available(&self) -> bool;

    /// Start speaking `utterance`.
    fn speak(&mut self, attempt: AttemptId, utterance: &Utterance) -> Result<(), EngineError>;

    /// Drop whatever is playing or queued. A no-op when silent.
    fn cancel(&mut self);

    /// Current voice catalog. May be empty until the engine has loaded it.
    fn list_voices(&self) -> Vec<VoiceHandle>;
}

/// Callback emitted by a synthesis engine for one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Started,
    Ended,
    Error(String),
    Paused,
    Resumed,
}
