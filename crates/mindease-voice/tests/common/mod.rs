//! Shared harness: a controller wired to recording fakes on a virtual clock.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use mindease_core::testing::{FakeProbes, fake_ports};
use mindease_core::{AttemptId, InMemoryPreferenceStore, RecognitionEvent, SpeechEvent, VoiceHandle};
use mindease_voice::{ControllerEvent, VoiceConfig, VoiceController};

pub fn default_voices() -> Vec<VoiceHandle> {
    vec![
        VoiceHandle::named("Samantha", "en-US"),
        VoiceHandle::named("Google UK English Female", "en-GB"),
        VoiceHandle::named("Lekha", "hi-IN"),
    ]
}

pub struct Harness {
    pub controller: VoiceController,
    pub probes: FakeProbes,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(InMemoryPreferenceStore::new(), |_| {})
    }

    pub fn with_preferences(store: InMemoryPreferenceStore) -> Self {
        Self::build(store, |_| {})
    }

    /// `setup` runs against the probes before the controller is constructed,
    /// e.g. to make an engine unavailable.
    pub fn build(store: InMemoryPreferenceStore, setup: impl FnOnce(&FakeProbes)) -> Self {
        let (ports, probes) = fake_ports(default_voices(), Arc::new(store));
        setup(&probes);
        let controller = VoiceController::new(VoiceConfig::default(), ports);
        Self { controller, probes }
    }

    pub fn send(&mut self, event: ControllerEvent) {
        self.controller.handle(event);
    }

    /// Move the virtual clock forward, firing every timer that comes due.
    pub fn advance(&mut self, ms: u64) {
        let target = self.probes.timers.now() + Duration::from_millis(ms);
        while let Some(token) = self.probes.timers.next_due(target) {
            self.controller.handle(ControllerEvent::TimerFired(token));
        }
    }

    /// Enable voice mode and let the grace delay run out.
    pub fn enable_and_listen(&mut self) {
        self.send(ControllerEvent::EnableRequested);
        self.advance(500);
    }

    pub fn recognition_attempt(&self) -> AttemptId {
        self.probes
            .recognizer
            .last_attempt()
            .expect("no recognition attempt started")
    }

    pub fn speech_attempt(&self) -> AttemptId {
        self.probes
            .synthesizer
            .last_attempt()
            .expect("no speech attempt started")
    }

    /// Deliver a callback for the most recent recognition attempt.
    pub fn recognition(&mut self, event: RecognitionEvent) {
        let attempt = self.recognition_attempt();
        self.send(ControllerEvent::Recognition { attempt, event });
    }

    /// Deliver a callback for the most recent speech attempt.
    pub fn speech(&mut self, event: SpeechEvent) {
        let attempt = self.speech_attempt();
        self.send(ControllerEvent::Speech { attempt, event });
    }

    pub fn final_transcript(&mut self, text: &str) {
        self.recognition(RecognitionEvent::Result {
            transcript: text.to_string(),
            is_final: true,
        });
    }

    pub fn starts(&self) -> usize {
        self.probes.recognizer.start_count()
    }
}
