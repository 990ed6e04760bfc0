//! Voice controller: the state machine behind voice mode.
//!
//! ```text
//!            enable (500ms grace)
//!   Idle ─────────────────────────▶ Listening ── final ──▶ Idle ─ 800ms ─▶ send
//!    ▲ ▲                                 │                  │
//!    │ └── restart (2000/1000ms) ◀── error / silence / timeout
//!    │
//!    └── restart (500ms) ◀── Speaking ◀── speak(text)
//! ```
//!
//! The controller is a synchronous, single-consumer event processor.
//! [`VoiceController::handle`] runs one [`ControllerEvent`] to completion;
//! engine callbacks and timer firings are posted back as further events.
//! Every callback carries the [`AttemptId`] or [`TimerToken`] it was issued
//! with, and anything that no longer matches is dropped.
//!
//! At most one timer is pending at a time. Arming a timer always cancels the
//! previous one first, and every timer re-checks its preconditions when it
//! fires.

use std::sync::Arc;
use std::time::Duration;

use mindease_core::{
    AttemptId, ChatPort, FeedbackSink, Indicator, LanguageCode, RecognitionErrorKind,
    RecognitionEvent, Severity, SpeechEvent, TimerPort, TimerToken, VoiceHandle, VoicePorts,
};
use serde::Serialize;

use crate::catalog::VoiceCatalog;
use crate::config::VoiceConfig;
use crate::error::{Capability, VoiceError};
use crate::preferences::VoicePreferences;
use crate::recognition::{ErrorClass, RecognitionOutcome, RecognitionSession};
use crate::speech::{SpeechOutcome, SpeechSession};

const ENABLED_MESSAGE: &str = "Voice mode enabled. Speak your message!";
const DISABLED_MESSAGE: &str = "Voice mode disabled";
const UNAVAILABLE_MESSAGE: &str = "Voice recognition not available";
const ESCALATION_MESSAGE: &str = "Voice recognition turned off after repeated errors";
const RESTORED_MESSAGE: &str = "Voice features available again";

// ── Phase and status ───────────────────────────────────────────────

/// What the audio devices are doing. Listening and Speaking are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    #[default]
    Idle,
    Listening,
    Speaking,
}

/// Externally visible controller status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VoiceStatus {
    /// Voice recognition cannot run this session.
    Disabled,
    Idle,
    Listening,
    Speaking,
}

/// Why voice recognition is off for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisabledReason {
    /// An engine is missing; cleared if the capability reappears.
    CapabilityUnavailable(Capability),
    /// The recognition engine rejected the selected language.
    LanguageNotSupported,
    /// Engine-internal failures hit the configured limit.
    RepeatedEngineFailure,
}

// ── Timers ─────────────────────────────────────────────────────────

/// What the single pending timer will do when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPurpose {
    /// Open the microphone after voice mode was switched on.
    GraceStart,
    /// Re-enable voice mode from a persisted preference.
    RestoreEnable,
    /// Ask the chat to send the transcript in its input.
    SendTranscript,
    /// Listen again after a retryable recognition error.
    RetryListen,
    /// Listen again after an attempt ended without a usable result.
    SilenceRestart,
    /// Listen again after speech playback finished.
    PostSpeechRestart,
    /// Give up on the current listening attempt.
    ListenTimeout,
}

impl TimerPurpose {
    /// Timers that belong to the listening loop and give way to speech or
    /// typing.
    const fn is_listening_loop(self) -> bool {
        matches!(
            self,
            Self::GraceStart
                | Self::RetryListen
                | Self::SilenceRestart
                | Self::PostSpeechRestart
                | Self::ListenTimeout
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTimer {
    token: TimerToken,
    purpose: TimerPurpose,
}

// ── Events ─────────────────────────────────────────────────────────

/// Everything the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    EnableRequested,
    DisableRequested,
    ToggleRequested,
    /// Reply text to read aloud.
    SpeakRequested(String),
    LanguageChanged(LanguageCode),
    /// The user started typing.
    ManualInput,
    VisibilityChanged { hidden: bool },
    Recognition {
        attempt: AttemptId,
        event: RecognitionEvent,
    },
    Speech {
        attempt: AttemptId,
        event: SpeechEvent,
    },
    /// The synthesis engine's voice list changed.
    VoicesChanged,
    /// An engine may have appeared or disappeared.
    CapabilitiesChanged,
    TimerFired(TimerToken),
    Shutdown,
}

/// Snapshot of what the runtime provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceCapabilities {
    pub recognition: bool,
    pub synthesis: bool,
    pub voices_available: usize,
    pub selected_voice: Option<String>,
}

// ── Controller ─────────────────────────────────────────────────────

/// Coordinates recognition, speech, timers and preferences.
pub struct VoiceController {
    config: VoiceConfig,
    recognition: RecognitionSession,
    speech: SpeechSession,
    catalog: VoiceCatalog,
    timers: Box<dyn TimerPort>,
    preferences: VoicePreferences,
    feedback: Arc<dyn FeedbackSink>,
    chat: Arc<dyn ChatPort>,

    enabled: bool,
    phase: Phase,
    disabled: Option<DisabledReason>,
    language: LanguageCode,
    selected_voice: Option<VoiceHandle>,
    pending: Option<PendingTimer>,
    next_token: TimerToken,
    hidden: bool,
    shut_down: bool,
}

impl VoiceController {
    /// Build a controller, probe the engines and apply stored preferences.
    ///
    /// A stored `enabled` flag arms a restore timer rather than starting
    /// immediately.
    pub fn new(config: VoiceConfig, ports: VoicePorts) -> Self {
        let VoicePorts {
            recognizer,
            synthesizer,
            timers,
            preferences,
            feedback,
            chat,
        } = ports;

        let failure_limit = config.engine_failure_limit;
        let delivery = config.delivery;

        let mut controller = Self {
            config,
            recognition: RecognitionSession::new(recognizer, failure_limit),
            speech: SpeechSession::new(synthesizer, delivery),
            catalog: VoiceCatalog::new(),
            timers,
            preferences: VoicePreferences::new(preferences),
            feedback,
            chat,
            enabled: false,
            phase: Phase::Idle,
            disabled: None,
            language: LanguageCode::Auto,
            selected_voice: None,
            pending: None,
            next_token: TimerToken(1),
            hidden: false,
            shut_down: false,
        };

        if let Some(capability) = controller.missing_capability() {
            controller.report_missing(capability);
            controller.disabled = Some(DisabledReason::CapabilityUnavailable(capability));
        }
        controller.refresh_voices();
        controller.restore_preferences();
        controller.publish_indicator();

        controller
    }

    /// Process one event to completion.
    pub fn handle(&mut self, event: ControllerEvent) {
        if self.shut_down {
            tracing::debug!(?event, "Controller shut down, dropping event");
            return;
        }

        match event {
            ControllerEvent::EnableRequested => self.enable_voice_mode(),
            ControllerEvent::DisableRequested => self.disable_voice_mode(),
            ControllerEvent::ToggleRequested => self.toggle_voice_mode(),
            ControllerEvent::SpeakRequested(text) => self.speak(&text),
            ControllerEvent::LanguageChanged(language) => self.set_language(language),
            ControllerEvent::ManualInput => self.on_manual_input(),
            ControllerEvent::VisibilityChanged { hidden } => self.set_hidden(hidden),
            ControllerEvent::Recognition { attempt, event } => self.on_recognition(attempt, event),
            ControllerEvent::Speech { attempt, event } => self.on_speech(attempt, event),
            ControllerEvent::VoicesChanged => self.refresh_voices(),
            ControllerEvent::CapabilitiesChanged => self.on_capabilities_changed(),
            ControllerEvent::TimerFired(token) => self.on_timer(token),
            ControllerEvent::Shutdown => self.shutdown(),
        }
    }

    // ── Public operations ──────────────────────────────────────────

    /// Switch voice mode on. Listening starts after the grace delay.
    ///
    /// Does nothing when voice mode is already on.
    pub fn enable_voice_mode(&mut self) {
        if self.enabled {
            tracing::debug!("Voice mode already enabled");
            return;
        }
        if let Some(reason) = self.disabled {
            tracing::warn!(?reason, "Cannot enable voice mode");
            self.feedback.notify(UNAVAILABLE_MESSAGE, Severity::Error);
            return;
        }

        self.enabled = true;
        self.preferences.save_enabled(true);
        tracing::info!("Voice mode enabled");
        self.feedback.notify(ENABLED_MESSAGE, Severity::Success);
        self.publish_indicator();
        self.arm(TimerPurpose::GraceStart, self.config.timings.grace_delay());
    }

    /// Switch voice mode off, stopping both engines.
    pub fn disable_voice_mode(&mut self) {
        self.cancel_timer();
        self.recognition.stop();
        self.speech.cancel();
        self.enabled = false;
        self.preferences.save_enabled(false);

        tracing::info!("Voice mode disabled");
        self.set_phase(Phase::Idle);
        self.publish_indicator();
        self.feedback.notify(DISABLED_MESSAGE, Severity::Info);
    }

    pub fn toggle_voice_mode(&mut self) {
        if self.enabled {
            self.disable_voice_mode();
        } else {
            self.enable_voice_mode();
        }
    }

    /// Read `text` aloud.
    ///
    /// Replaces any utterance in progress. A live recognition attempt is
    /// stopped before playback starts so the microphone does not pick up
    /// the reply.
    pub fn speak(&mut self, text: &str) {
        let voice = self.selected_voice.clone();
        let utterance = match self.speech.prepare(text, self.language, voice) {
            Ok(Some(utterance)) => utterance,
            Ok(None) => return,
            Err(VoiceError::CapabilityUnavailable(capability)) => {
                tracing::debug!(?capability, "Speech unavailable, reply stays text-only");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to prepare speech");
                return;
            }
        };

        if self.recognition.stop() {
            tracing::debug!("Stopped listening before speaking");
        }
        self.cancel_listening_timers();

        match self.speech.play(&utterance) {
            Ok(_) => self.set_phase(Phase::Speaking),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to start speech");
                let err = VoiceError::PlaybackError(e.to_string());
                self.feedback.notify(&err.user_message(), Severity::Error);
                // The previous utterance was cancelled too, so nothing will end it.
                if !self.speech.is_active() {
                    self.finish_speaking();
                }
            }
        }
    }

    /// Change language. Takes effect on the next attempt.
    pub fn set_language(&mut self, language: LanguageCode) {
        tracing::info!(old = %self.language, new = %language, "Voice language changed");
        self.language = language;
        self.preferences.save_language(language);
        self.reselect_voice();
    }

    /// Stop and cancel everything. Preferences are left untouched.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.cancel_timer();
        self.recognition.stop();
        self.speech.cancel();
        self.phase = Phase::Idle;
        self.shut_down = true;
        tracing::info!("Voice controller shut down");
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn status(&self) -> VoiceStatus {
        match (self.disabled, self.phase) {
            (_, Phase::Speaking) => VoiceStatus::Speaking,
            (Some(_), _) => VoiceStatus::Disabled,
            (None, Phase::Idle) => VoiceStatus::Idle,
            (None, Phase::Listening) => VoiceStatus::Listening,
        }
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub const fn disabled_reason(&self) -> Option<DisabledReason> {
        self.disabled
    }

    pub const fn language(&self) -> LanguageCode {
        self.language
    }

    pub const fn selected_voice(&self) -> Option<&VoiceHandle> {
        self.selected_voice.as_ref()
    }

    /// Purpose of the pending timer, if any.
    pub fn pending_timer(&self) -> Option<TimerPurpose> {
        self.pending.map(|p| p.purpose)
    }

    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn last_final_transcript(&self) -> &str {
        self.recognition.last_final_transcript()
    }

    pub fn interim_transcript(&self) -> &str {
        self.recognition.interim_transcript()
    }

    pub fn capabilities(&self) -> VoiceCapabilities {
        VoiceCapabilities {
            recognition: self.recognition.is_available(),
            synthesis: self.speech.is_available(),
            voices_available: self.catalog.voices().len(),
            selected_voice: self.selected_voice.as_ref().map(|v| v.name.clone()),
        }
    }

    // ── Event handlers ─────────────────────────────────────────────

    fn on_recognition(&mut self, attempt: AttemptId, event: RecognitionEvent) {
        match self.recognition.handle(attempt, event) {
            RecognitionOutcome::Stale => {}
            RecognitionOutcome::Opened => tracing::debug!(%attempt, "Microphone open"),
            RecognitionOutcome::Interim(text) => self.chat.fill_input(&text, false),
            RecognitionOutcome::Final(text) => self.on_final_transcript(&text),
            RecognitionOutcome::NoResult => {
                self.end_listening();
                self.schedule_restart(TimerPurpose::SilenceRestart);
            }
            RecognitionOutcome::Failed { kind, class } => {
                self.end_listening();
                self.on_recognition_error(kind, class);
            }
        }
    }

    fn on_final_transcript(&mut self, text: &str) {
        self.end_listening();
        self.chat.fill_input(text, true);

        let len = text.chars().count();
        let min = self.config.min_transcript_chars;
        if len >= min {
            tracing::debug!(len, "Final transcript accepted");
            self.arm(TimerPurpose::SendTranscript, self.config.timings.send_delay());
        } else {
            let err = VoiceError::TranscriptTooShort { len, min };
            tracing::debug!(error = %err, "Final transcript rejected");
            self.feedback.notify(&err.user_message(), Severity::Error);
            self.schedule_restart(TimerPurpose::SilenceRestart);
        }
    }

    fn on_recognition_error(&mut self, kind: RecognitionErrorKind, class: ErrorClass) {
        let err = match class {
            ErrorClass::Retryable => VoiceError::Retryable(kind.clone()),
            ErrorClass::UserActionRequired => VoiceError::PermissionDenied(kind.clone()),
            ErrorClass::Fatal => VoiceError::RecognitionFailed(kind.clone()),
        };
        tracing::warn!(error = %err, "Recognition attempt failed");
        self.feedback.notify(&err.user_message(), Severity::Error);

        match class {
            ErrorClass::Retryable => self.schedule_restart(TimerPurpose::RetryListen),
            ErrorClass::UserActionRequired => {
                // Off for now so the next enable request starts over; the
                // stored preference keeps the user's choice.
                tracing::info!("Waiting for the user to re-enable voice mode");
                self.enabled = false;
                self.publish_indicator();
            }
            ErrorClass::Fatal => {
                let reason = if kind == RecognitionErrorKind::LanguageNotSupported {
                    DisabledReason::LanguageNotSupported
                } else {
                    self.feedback.notify(ESCALATION_MESSAGE, Severity::Error);
                    DisabledReason::RepeatedEngineFailure
                };
                self.disable_feature(reason);
            }
        }
    }

    fn on_speech(&mut self, attempt: AttemptId, event: SpeechEvent) {
        match self.speech.handle(attempt, event) {
            SpeechOutcome::Stale => {}
            SpeechOutcome::Started => tracing::debug!(%attempt, "Playback started"),
            SpeechOutcome::Paused => self.feedback.set_indicator(Indicator::Paused),
            SpeechOutcome::Resumed => self.feedback.set_indicator(Indicator::Speaking),
            SpeechOutcome::Finished => self.finish_speaking(),
            SpeechOutcome::Failed(reason) => {
                let err = VoiceError::PlaybackError(reason);
                self.feedback.notify(&err.user_message(), Severity::Error);
                self.finish_speaking();
            }
        }
    }

    fn finish_speaking(&mut self) {
        self.set_phase(Phase::Idle);

        // The send timer restarts listening itself once it fires.
        if self.pending_timer() == Some(TimerPurpose::SendTranscript) {
            return;
        }
        self.schedule_restart(TimerPurpose::PostSpeechRestart);
    }

    fn on_manual_input(&mut self) {
        let stopped_listening = self.recognition.stop();
        let stopped_speaking = self.speech.cancel();
        self.cancel_listening_timers();
        self.set_phase(Phase::Idle);
        tracing::debug!(stopped_listening, stopped_speaking, "User typing, voice paused");
    }

    fn set_hidden(&mut self, hidden: bool) {
        if self.hidden == hidden {
            return;
        }
        self.hidden = hidden;
        tracing::debug!(hidden, "Visibility changed");

        if hidden {
            self.cancel_listening_timers();
            if self.recognition.stop() {
                self.set_phase(Phase::Idle);
            }
        } else if self.pending.is_none() && self.can_auto_listen() {
            self.arm(TimerPurpose::GraceStart, self.config.timings.grace_delay());
        }
    }

    fn on_capabilities_changed(&mut self) {
        match (self.missing_capability(), self.disabled) {
            (None, Some(DisabledReason::CapabilityUnavailable(capability))) => {
                tracing::info!(?capability, "Voice capability restored");
                self.disabled = None;
                self.feedback.notify(RESTORED_MESSAGE, Severity::Info);
                self.publish_indicator();
                if self.pending.is_none() && self.can_auto_listen() {
                    self.arm(TimerPurpose::GraceStart, self.config.timings.grace_delay());
                }
            }
            (Some(capability), None) => {
                self.report_missing(capability);
                self.disable_feature(DisabledReason::CapabilityUnavailable(capability));
            }
            (Some(capability), Some(DisabledReason::CapabilityUnavailable(_))) => {
                self.disabled = Some(DisabledReason::CapabilityUnavailable(capability));
            }
            _ => {}
        }
        self.refresh_voices();
    }

    fn on_timer(&mut self, token: TimerToken) {
        let Some(pending) = self.pending.filter(|p| p.token == token) else {
            tracing::debug!(%token, "Ignoring stale timer");
            return;
        };
        self.pending = None;
        tracing::debug!(%token, purpose = ?pending.purpose, "Timer fired");

        match pending.purpose {
            TimerPurpose::GraceStart
            | TimerPurpose::RetryListen
            | TimerPurpose::SilenceRestart
            | TimerPurpose::PostSpeechRestart => {
                if self.can_auto_listen() {
                    self.start_listening();
                } else {
                    tracing::debug!(purpose = ?pending.purpose, "Restart no longer wanted");
                }
            }
            TimerPurpose::RestoreEnable => self.enable_voice_mode(),
            TimerPurpose::SendTranscript => {
                self.chat.request_send();
                self.schedule_restart(TimerPurpose::SilenceRestart);
            }
            TimerPurpose::ListenTimeout => {
                if self.recognition.stop() {
                    tracing::info!("Listening timed out");
                }
                self.set_phase(Phase::Idle);
                self.schedule_restart(TimerPurpose::SilenceRestart);
            }
        }
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn start_listening(&mut self) {
        if self.speech.cancel() {
            tracing::debug!("Cancelled speech before listening");
        }

        match self.recognition.start(self.language) {
            Ok(_) => {
                self.set_phase(Phase::Listening);
                self.arm(
                    TimerPurpose::ListenTimeout,
                    self.config.timings.listen_timeout(),
                );
            }
            Err(VoiceError::CapabilityUnavailable(capability)) => {
                self.report_missing(capability);
                self.disable_feature(DisabledReason::CapabilityUnavailable(capability));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to start listening");
                self.feedback.notify(&e.user_message(), Severity::Error);
                self.set_phase(Phase::Idle);
            }
        }
    }

    /// Leave Listening after the attempt closed.
    fn end_listening(&mut self) {
        if self.pending_timer() == Some(TimerPurpose::ListenTimeout) {
            self.cancel_timer();
        }
        self.set_phase(Phase::Idle);
    }

    /// Arm a listening restart if the loop should continue.
    fn schedule_restart(&mut self, purpose: TimerPurpose) {
        if !self.can_auto_listen() {
            tracing::debug!(?purpose, "Not restarting listening");
            return;
        }

        let timings = &self.config.timings;
        let delay = match purpose {
            TimerPurpose::RetryListen => timings.retry_delay(),
            TimerPurpose::PostSpeechRestart => timings.post_speech_restart(),
            TimerPurpose::GraceStart => timings.grace_delay(),
            _ => timings.silence_restart(),
        };
        self.arm(purpose, delay);
    }

    const fn can_auto_listen(&self) -> bool {
        self.enabled
            && !self.hidden
            && self.disabled.is_none()
            && matches!(self.phase, Phase::Idle)
    }

    fn disable_feature(&mut self, reason: DisabledReason) {
        tracing::warn!(?reason, "Voice recognition disabled for this session");
        self.disabled = Some(reason);
        self.cancel_timer();
        self.recognition.stop();
        if reason == DisabledReason::CapabilityUnavailable(Capability::Synthesis) {
            self.speech.cancel();
        }

        let phase = if self.speech.is_active() {
            Phase::Speaking
        } else {
            Phase::Idle
        };
        self.set_phase(phase);
        self.publish_indicator();
    }

    fn missing_capability(&self) -> Option<Capability> {
        if !self.recognition.is_available() {
            Some(Capability::Recognition)
        } else if !self.speech.is_available() {
            Some(Capability::Synthesis)
        } else {
            None
        }
    }

    fn report_missing(&self, capability: Capability) {
        let err = VoiceError::CapabilityUnavailable(capability);
        tracing::warn!(error = %err, "Voice mode unavailable");
        self.feedback.notify(&err.user_message(), Severity::Error);
    }

    fn restore_preferences(&mut self) {
        let stored = self.preferences.load();

        if let Some(language) = stored.language {
            self.language = language;
            self.reselect_voice();
        }

        if stored.enabled {
            if self.disabled.is_some() {
                tracing::debug!("Stored voice mode ignored, feature disabled");
            } else {
                tracing::info!("Restoring voice mode from preferences");
                self.arm(
                    TimerPurpose::RestoreEnable,
                    self.config.timings.restore_delay(),
                );
            }
        }
    }

    fn refresh_voices(&mut self) {
        self.catalog.refresh(self.speech.voices());
        self.reselect_voice();
    }

    fn reselect_voice(&mut self) {
        self.selected_voice = self.catalog.select(self.language);
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            tracing::debug!(old = ?self.phase, new = ?phase, "Voice phase transition");
            self.phase = phase;
            self.publish_indicator();
        }
    }

    fn publish_indicator(&self) {
        let indicator = match self.phase {
            Phase::Idle => Indicator::Idle {
                voice_enabled: self.enabled && self.disabled.is_none(),
            },
            Phase::Listening => Indicator::Listening,
            Phase::Speaking => Indicator::Speaking,
        };
        self.feedback.set_indicator(indicator);
    }

    fn arm(&mut self, purpose: TimerPurpose, delay: Duration) {
        self.cancel_timer();
        let token = self.next_token.advance();
        self.timers.arm(token, delay);
        self.pending = Some(PendingTimer { token, purpose });
        tracing::debug!(%token, ?purpose, delay_ms = delay.as_millis(), "Timer armed");
    }

    fn cancel_timer(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.timers.cancel(pending.token);
            tracing::debug!(token = %pending.token, purpose = ?pending.purpose, "Timer cancelled");
        }
    }

    fn cancel_listening_timers(&mut self) {
        if self.pending_timer().is_some_and(TimerPurpose::is_listening_loop) {
            self.cancel_timer();
        }
    }
}

impl Drop for VoiceController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
