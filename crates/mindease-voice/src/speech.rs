//! One text-to-speech attempt at a time.

use mindease_core::{AttemptId, LanguageCode, SpeechEvent, SpeechSynthesizer, Utterance, VoiceHandle};

use crate::config::DeliveryParams;
use crate::error::{Capability, VoiceError};
use crate::text_utils::normalize_for_speech;

/// Result of feeding one utterance callback to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// Callback for an attempt that is no longer live.
    Stale,
    Started,
    Paused,
    Resumed,
    /// Playback completed.
    Finished,
    /// Playback failed; the attempt is over.
    Failed(String),
}

/// Owns the synthesis engine and the lifecycle of its utterances.
pub struct SpeechSession {
    engine: Box<dyn SpeechSynthesizer>,
    delivery: DeliveryParams,
    next_attempt: AttemptId,
    current: Option<AttemptId>,
}

impl SpeechSession {
    pub fn new(engine: Box<dyn SpeechSynthesizer>, delivery: DeliveryParams) -> Self {
        Self {
            engine,
            delivery,
            next_attempt: AttemptId(1),
            current: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_available()
    }

    pub const fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// The engine's current voice list.
    pub fn voices(&self) -> Vec<VoiceHandle> {
        self.engine.list_voices()
    }

    /// Speak `text` after cancelling whatever is playing.
    ///
    /// Returns `Ok(None)` without touching the engine when the text
    /// normalizes to nothing.
    pub fn speak(
        &mut self,
        text: &str,
        lang: LanguageCode,
        voice: Option<VoiceHandle>,
    ) -> Result<Option<AttemptId>, VoiceError> {
        match self.prepare(text, lang, voice)? {
            Some(utterance) => self.play(&utterance).map(Some),
            None => Ok(None),
        }
    }

    /// Build the utterance for `text` without touching playback.
    ///
    /// `Ok(None)` means there is nothing speakable.
    pub fn prepare(
        &self,
        text: &str,
        lang: LanguageCode,
        voice: Option<VoiceHandle>,
    ) -> Result<Option<Utterance>, VoiceError> {
        if !self.engine.is_available() {
            return Err(VoiceError::CapabilityUnavailable(Capability::Synthesis));
        }

        let text = normalize_for_speech(text);
        if text.is_empty() {
            tracing::debug!("Nothing speakable after normalization");
            return Ok(None);
        }

        Ok(Some(Utterance {
            text,
            voice,
            rate: self.delivery.rate,
            pitch: self.delivery.pitch,
            volume: self.delivery.volume,
            lang,
        }))
    }

    /// Cancel whatever is playing and hand `utterance` to the engine.
    ///
    /// On error nothing is playing afterwards.
    pub fn play(&mut self, utterance: &Utterance) -> Result<AttemptId, VoiceError> {
        self.cancel();

        let attempt = self.next_attempt.advance();
        self.engine.speak(attempt, utterance)?;
        self.current = Some(attempt);

        tracing::debug!(
            %attempt,
            chars = utterance.text.len(),
            voice = utterance.voice.as_ref().map_or("default", |v| v.name.as_str()),
            "Speaking"
        );
        Ok(attempt)
    }

    /// Cancel the live utterance. Returns `false` (and does nothing) when idle.
    pub fn cancel(&mut self) -> bool {
        let Some(attempt) = self.current.take() else {
            return false;
        };
        self.engine.cancel();
        tracing::debug!(%attempt, "Speech cancelled");
        true
    }

    /// Feed one utterance callback.
    pub fn handle(&mut self, attempt: AttemptId, event: SpeechEvent) -> SpeechOutcome {
        if self.current != Some(attempt) {
            tracing::debug!(%attempt, ?event, "Ignoring stale speech callback");
            return SpeechOutcome::Stale;
        }

        match event {
            SpeechEvent::Started => SpeechOutcome::Started,
            SpeechEvent::Paused => SpeechOutcome::Paused,
            SpeechEvent::Resumed => SpeechOutcome::Resumed,
            SpeechEvent::Ended => {
                self.current = None;
                SpeechOutcome::Finished
            }
            SpeechEvent::Error(reason) => {
                self.current = None;
                tracing::warn!(%attempt, %reason, "Speech synthesis error");
                SpeechOutcome::Failed(reason)
            }
        }
    }
}
