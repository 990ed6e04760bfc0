//! Recording fakes for every controller port.
//!
//! Enabled with the `test-utils` feature. Each fake comes with a cloneable
//! probe that shares its state, so a test can hand the fake to the
//! controller and keep inspecting what it was asked to do.
//!
//! [`FakeTimers`] runs on a virtual clock: nothing fires by itself. Tests
//! advance the clock through [`TimerProbe::next_due`] and feed the returned
//! tokens back into the controller.

#![allow(clippy::missing_panics_doc)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::{AttemptId, TimerToken, Utterance, VoiceHandle};
use crate::ports::{
    ChatPort, EngineError, FeedbackSink, InMemoryPreferenceStore, Indicator, PreferenceStore,
    Severity, SpeechRecognizer, SpeechSynthesizer, TimerPort, VoicePorts,
};

// ── Recognizer ─────────────────────────────────────────────────────

/// A call the controller made on the recognition engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerCall {
    Start { attempt: AttemptId, language_tag: String },
    Stop,
}

#[derive(Debug)]
struct RecognizerState {
    available: bool,
    reject_start: Option<EngineError>,
    calls: Vec<RecognizerCall>,
}

/// Recognition engine that records calls and never emits events on its own.
#[derive(Debug)]
pub struct FakeRecognizer {
    state: Arc<Mutex<RecognizerState>>,
}

/// Inspection handle for a [`FakeRecognizer`].
#[derive(Debug, Clone)]
pub struct RecognizerProbe {
    state: Arc<Mutex<RecognizerState>>,
}

impl FakeRecognizer {
    pub fn new() -> (Self, RecognizerProbe) {
        let state = Arc::new(Mutex::new(RecognizerState {
            available: true,
            reject_start: None,
            calls: Vec::new(),
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            RecognizerProbe { state },
        )
    }
}

impl SpeechRecognizer for FakeRecognizer {
    fn is_available(&self) -> bool {
        self.state.lock().unwrap().available
    }

    fn start(&mut self, attempt: AttemptId, language_tag: &str) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.reject_start.take() {
            return Err(err);
        }
        state.calls.push(RecognizerCall::Start {
            attempt,
            language_tag: language_tag.to_string(),
        });
        Ok(())
    }

    fn stop(&mut self) {
        self.state.lock().unwrap().calls.push(RecognizerCall::Stop);
    }
}

impl RecognizerProbe {
    pub fn calls(&self) -> Vec<RecognizerCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Every `start` call as `(attempt, language_tag)`.
    pub fn starts(&self) -> Vec<(AttemptId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecognizerCall::Start {
                    attempt,
                    language_tag,
                } => Some((attempt, language_tag)),
                RecognizerCall::Stop => None,
            })
            .collect()
    }

    pub fn start_count(&self) -> usize {
        self.starts().len()
    }

    pub fn stop_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RecognizerCall::Stop))
            .count()
    }

    /// Attempt id of the most recent `start`.
    pub fn last_attempt(&self) -> Option<AttemptId> {
        self.starts().last().map(|(attempt, _)| *attempt)
    }

    pub fn set_available(&self, available: bool) {
        self.state.lock().unwrap().available = available;
    }

    /// Make the next `start` call fail with `err`.
    pub fn reject_next_start(&self, err: EngineError) {
        self.state.lock().unwrap().reject_start = Some(err);
    }
}

// ── Synthesizer ────────────────────────────────────────────────────

/// A call the controller made on the synthesis engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesizerCall {
    Speak { attempt: AttemptId, utterance: Utterance },
    Cancel,
}

#[derive(Debug)]
struct SynthesizerState {
    available: bool,
    reject_speak: Option<EngineError>,
    voices: Vec<VoiceHandle>,
    calls: Vec<SynthesizerCall>,
}

/// Synthesis engine that records calls and never emits events on its own.
#[derive(Debug)]
pub struct FakeSynthesizer {
    state: Arc<Mutex<SynthesizerState>>,
}

/// Inspection handle for a [`FakeSynthesizer`].
#[derive(Debug, Clone)]
pub struct SynthesizerProbe {
    state: Arc<Mutex<SynthesizerState>>,
}

impl FakeSynthesizer {
    pub fn new(voices: Vec<VoiceHandle>) -> (Self, SynthesizerProbe) {
        let state = Arc::new(Mutex::new(SynthesizerState {
            available: true,
            reject_speak: None,
            voices,
            calls: Vec::new(),
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            SynthesizerProbe { state },
        )
    }
}

impl SpeechSynthesizer for FakeSynthesizer {
    fn is_available(&self) -> bool {
        self.state.lock().unwrap().available
    }

    fn speak(&mut self, attempt: AttemptId, utterance: &Utterance) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.reject_speak.take() {
            return Err(err);
        }
        state.calls.push(SynthesizerCall::Speak {
            attempt,
            utterance: utterance.clone(),
        });
        Ok(())
    }

    fn cancel(&mut self) {
        self.state.lock().unwrap().calls.push(SynthesizerCall::Cancel);
    }

    fn list_voices(&self) -> Vec<VoiceHandle> {
        self.state.lock().unwrap().voices.clone()
    }
}

impl SynthesizerProbe {
    pub fn calls(&self) -> Vec<SynthesizerCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Every utterance handed to `speak`, with its attempt id.
    pub fn spoken(&self) -> Vec<(AttemptId, Utterance)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SynthesizerCall::Speak { attempt, utterance } => Some((attempt, utterance)),
                SynthesizerCall::Cancel => None,
            })
            .collect()
    }

    pub fn last_attempt(&self) -> Option<AttemptId> {
        self.spoken().last().map(|(attempt, _)| *attempt)
    }

    pub fn cancel_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, SynthesizerCall::Cancel))
            .count()
    }

    pub fn set_voices(&self, voices: Vec<VoiceHandle>) {
        self.state.lock().unwrap().voices = voices;
    }

    pub fn set_available(&self, available: bool) {
        self.state.lock().unwrap().available = available;
    }

    /// Make the next `speak` call fail with `err`.
    pub fn reject_next_speak(&self, err: EngineError) {
        self.state.lock().unwrap().reject_speak = Some(err);
    }
}

// ── Timers ─────────────────────────────────────────────────────────

/// One operation the controller performed on the timer port, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOp {
    Armed { token: TimerToken, delay: Duration },
    Cancelled { token: TimerToken },
}

#[derive(Debug, Default)]
struct TimerState {
    now: Duration,
    armed: BTreeMap<TimerToken, Duration>,
    ops: Vec<TimerOp>,
}

/// Timer port on a virtual clock.
#[derive(Debug)]
pub struct FakeTimers {
    state: Arc<Mutex<TimerState>>,
}

/// Clock control and inspection for [`FakeTimers`].
#[derive(Debug, Clone)]
pub struct TimerProbe {
    state: Arc<Mutex<TimerState>>,
}

impl FakeTimers {
    pub fn new() -> (Self, TimerProbe) {
        let state = Arc::new(Mutex::new(TimerState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            TimerProbe { state },
        )
    }
}

impl TimerPort for FakeTimers {
    fn arm(&mut self, token: TimerToken, delay: Duration) {
        let mut state = self.state.lock().unwrap();
        let deadline = state.now + delay;
        state.armed.insert(token, deadline);
        state.ops.push(TimerOp::Armed { token, delay });
    }

    fn cancel(&mut self, token: TimerToken) {
        let mut state = self.state.lock().unwrap();
        state.armed.remove(&token);
        state.ops.push(TimerOp::Cancelled { token });
    }
}

impl TimerProbe {
    /// Every arm/cancel in call order.
    pub fn ops(&self) -> Vec<TimerOp> {
        self.state.lock().unwrap().ops.clone()
    }

    /// Number of timers armed and not yet fired or cancelled.
    pub fn outstanding(&self) -> usize {
        self.state.lock().unwrap().armed.len()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.state.lock().unwrap().now
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its deadline. Returns `None` (and moves the clock to `until`) when
    /// nothing is due.
    pub fn next_due(&self, until: Duration) -> Option<TimerToken> {
        let mut state = self.state.lock().unwrap();
        let due = state
            .armed
            .iter()
            .filter(|(_, deadline)| **deadline <= until)
            .min_by_key(|(token, deadline)| (**deadline, **token))
            .map(|(token, deadline)| (*token, *deadline));

        if let Some((token, deadline)) = due {
            state.armed.remove(&token);
            state.now = state.now.max(deadline);
            Some(token)
        } else {
            state.now = state.now.max(until);
            None
        }
    }
}

// ── UI + chat ──────────────────────────────────────────────────────

/// Feedback sink that records every notification and indicator change.
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    notifications: Mutex<Vec<(String, Severity)>>,
    indicators: Mutex<Vec<Indicator>>,
}

impl RecordingFeedback {
    pub fn notifications(&self) -> Vec<(String, Severity)> {
        self.notifications.lock().unwrap().clone()
    }

    /// Messages of all `Severity::Error` notifications.
    pub fn errors(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter(|(_, severity)| *severity == Severity::Error)
            .map(|(message, _)| message)
            .collect()
    }

    pub fn indicators(&self) -> Vec<Indicator> {
        self.indicators.lock().unwrap().clone()
    }

    pub fn last_indicator(&self) -> Option<Indicator> {
        self.indicators.lock().unwrap().last().copied()
    }
}

impl FeedbackSink for RecordingFeedback {
    fn notify(&self, message: &str, severity: Severity) {
        self.notifications
            .lock()
            .unwrap()
            .push((message.to_string(), severity));
    }

    fn set_indicator(&self, indicator: Indicator) {
        self.indicators.lock().unwrap().push(indicator);
    }
}

/// Chat collaborator that records input mirroring and send requests.
#[derive(Debug, Default)]
pub struct RecordingChat {
    filled: Mutex<Vec<(String, bool)>>,
    sends: AtomicUsize,
}

impl RecordingChat {
    /// Every `fill_input` call as `(text, is_final)`.
    pub fn filled(&self) -> Vec<(String, bool)> {
        self.filled.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }
}

impl ChatPort for RecordingChat {
    fn fill_input(&self, text: &str, is_final: bool) {
        self.filled.lock().unwrap().push((text.to_string(), is_final));
    }

    fn request_send(&self) {
        self.sends.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Bundle ─────────────────────────────────────────────────────────

/// Probes for every fake in a [`fake_ports`] bundle.
#[derive(Debug, Clone)]
pub struct FakeProbes {
    pub recognizer: RecognizerProbe,
    pub synthesizer: SynthesizerProbe,
    pub timers: TimerProbe,
    pub preferences: Arc<InMemoryPreferenceStore>,
    pub feedback: Arc<RecordingFeedback>,
    pub chat: Arc<RecordingChat>,
}

/// Build a full set of fake ports backed by `preferences`.
pub fn fake_ports(
    voices: Vec<VoiceHandle>,
    preferences: Arc<InMemoryPreferenceStore>,
) -> (VoicePorts, FakeProbes) {
    let (recognizer, recognizer_probe) = FakeRecognizer::new();
    let (synthesizer, synthesizer_probe) = FakeSynthesizer::new(voices);
    let (timers, timer_probe) = FakeTimers::new();
    let feedback = Arc::new(RecordingFeedback::default());
    let chat = Arc::new(RecordingChat::default());

    let shared_preferences: Arc<dyn PreferenceStore> = preferences.clone();
    let shared_feedback: Arc<dyn FeedbackSink> = feedback.clone();
    let shared_chat: Arc<dyn ChatPort> = chat.clone();

    let ports = VoicePorts {
        recognizer: Box::new(recognizer),
        synthesizer: Box::new(synthesizer),
        timers: Box::new(timers),
        preferences: shared_preferences,
        feedback: shared_feedback,
        chat: shared_chat,
    };

    let probes = FakeProbes {
        recognizer: recognizer_probe,
        synthesizer: synthesizer_probe,
        timers: timer_probe,
        preferences,
        feedback,
        chat,
    };

    (ports, probes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_clock_fires_in_deadline_order() {
        let (mut timers, probe) = FakeTimers::new();
        timers.arm(TimerToken(1), Duration::from_millis(500));
        timers.arm(TimerToken(2), Duration::from_millis(100));

        let until = Duration::from_secs(1);
        assert_eq!(probe.next_due(until), Some(TimerToken(2)));
        assert_eq!(probe.now(), Duration::from_millis(100));
        assert_eq!(probe.next_due(until), Some(TimerToken(1)));
        assert_eq!(probe.next_due(until), None);
        assert_eq!(probe.now(), until);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let (mut timers, probe) = FakeTimers::new();
        timers.arm(TimerToken(1), Duration::from_millis(10));
        timers.cancel(TimerToken(1));

        assert_eq!(probe.next_due(Duration::from_secs(1)), None);
        assert_eq!(probe.outstanding(), 0);
    }
}
