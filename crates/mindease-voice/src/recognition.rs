//! One speech-to-text attempt at a time.
//!
//! [`RecognitionSession`] wraps the engine port, stamps every attempt with a
//! fresh [`AttemptId`], turns engine callbacks into [`RecognitionOutcome`]s
//! and classifies errors. Callbacks for any attempt other than the live one
//! come back as [`RecognitionOutcome::Stale`].

use mindease_core::{
    AttemptId, LanguageCode, RecognitionErrorKind, RecognitionEvent, SpeechRecognizer,
};

use crate::error::{Capability, VoiceError};

/// How the controller reacts to a recognition error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Transient; listening restarts after the retry delay.
    Retryable,
    /// The user has to fix permissions; no restart.
    UserActionRequired,
    /// Voice mode is disabled for the rest of the session.
    Fatal,
}

/// Result of feeding one engine callback to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// Callback for an attempt that is no longer live.
    Stale,
    /// The microphone opened.
    Opened,
    /// Updated interim transcript; the attempt continues.
    Interim(String),
    /// Final transcript (trimmed); the attempt is over.
    Final(String),
    /// The attempt ended without a result (silence or abort).
    NoResult,
    /// The attempt failed.
    Failed {
        kind: RecognitionErrorKind,
        class: ErrorClass,
    },
}

impl RecognitionOutcome {
    /// Whether this outcome closes the attempt.
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Final(_) | Self::NoResult | Self::Failed { .. }
        )
    }
}

/// Owns the recognition engine and the lifecycle of its attempts.
pub struct RecognitionSession {
    engine: Box<dyn SpeechRecognizer>,
    next_attempt: AttemptId,
    current: Option<AttemptId>,
    interim: String,
    last_final: String,
    consecutive_failures: u32,
    failure_limit: u32,
}

impl RecognitionSession {
    pub fn new(engine: Box<dyn SpeechRecognizer>, failure_limit: u32) -> Self {
        Self {
            engine,
            next_attempt: AttemptId(1),
            current: None,
            interim: String::new(),
            last_final: String::new(),
            consecutive_failures: 0,
            failure_limit: failure_limit.max(1),
        }
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_available()
    }

    pub const fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn interim_transcript(&self) -> &str {
        &self.interim
    }

    pub fn last_final_transcript(&self) -> &str {
        &self.last_final
    }

    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Start a new attempt in `language`.
    ///
    /// Transcripts from the previous attempt are cleared first.
    pub fn start(&mut self, language: LanguageCode) -> Result<AttemptId, VoiceError> {
        if !self.engine.is_available() {
            return Err(VoiceError::CapabilityUnavailable(Capability::Recognition));
        }

        self.stop();
        self.interim.clear();
        self.last_final.clear();

        let attempt = self.next_attempt.advance();
        self.engine.start(attempt, language.engine_tag())?;
        self.current = Some(attempt);

        tracing::debug!(%attempt, tag = language.engine_tag(), "Recognition attempt started");
        Ok(attempt)
    }

    /// Stop the live attempt. Returns `false` (and does nothing) when idle.
    pub fn stop(&mut self) -> bool {
        let Some(attempt) = self.current.take() else {
            return false;
        };
        self.engine.stop();
        tracing::debug!(%attempt, "Recognition attempt stopped");
        true
    }

    /// Feed one engine callback.
    pub fn handle(&mut self, attempt: AttemptId, event: RecognitionEvent) -> RecognitionOutcome {
        if self.current != Some(attempt) {
            tracing::debug!(%attempt, ?event, "Ignoring stale recognition callback");
            return RecognitionOutcome::Stale;
        }

        match event {
            RecognitionEvent::Started => RecognitionOutcome::Opened,
            RecognitionEvent::Result {
                transcript,
                is_final: false,
            } => {
                self.interim = transcript;
                RecognitionOutcome::Interim(self.interim.clone())
            }
            RecognitionEvent::Result {
                transcript,
                is_final: true,
            } => {
                // The engine may keep the microphone open after a final result.
                self.stop();
                self.consecutive_failures = 0;
                self.interim.clear();
                self.last_final = transcript.trim().to_string();
                RecognitionOutcome::Final(self.last_final.clone())
            }
            RecognitionEvent::Error(RecognitionErrorKind::Aborted) | RecognitionEvent::Ended => {
                self.current = None;
                self.consecutive_failures = 0;
                RecognitionOutcome::NoResult
            }
            RecognitionEvent::Error(kind) => {
                self.current = None;
                let class = self.classify(&kind);
                tracing::warn!(%attempt, %kind, ?class, "Recognition error");
                RecognitionOutcome::Failed { kind, class }
            }
        }
    }

    /// Classify an error and update the consecutive engine-failure count.
    fn classify(&mut self, kind: &RecognitionErrorKind) -> ErrorClass {
        match kind {
            RecognitionErrorKind::Network | RecognitionErrorKind::Other(_) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= self.failure_limit {
                    ErrorClass::Fatal
                } else {
                    ErrorClass::Retryable
                }
            }
            RecognitionErrorKind::NoSpeech
            | RecognitionErrorKind::BadGrammar
            | RecognitionErrorKind::Aborted => {
                self.consecutive_failures = 0;
                ErrorClass::Retryable
            }
            RecognitionErrorKind::NotAllowed
            | RecognitionErrorKind::ServiceNotAllowed
            | RecognitionErrorKind::AudioCapture => {
                self.consecutive_failures = 0;
                ErrorClass::UserActionRequired
            }
            RecognitionErrorKind::LanguageNotSupported => {
                self.consecutive_failures = 0;
                ErrorClass::Fatal
            }
        }
    }
}
