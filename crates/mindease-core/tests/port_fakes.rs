//! Integration tests for the `test-utils` port fakes.
//!
//! Downstream controller tests lean on these fakes to observe exactly what
//! the controller asked of each collaborator, so their recording behaviour
//! is pinned down here.

use std::sync::Arc;
use std::time::Duration;

use mindease_core::testing::{TimerOp, fake_ports};
use mindease_core::{
    AttemptId, EngineError, InMemoryPreferenceStore, Indicator, LanguageCode, PreferenceStore,
    Severity, TimerToken, Utterance, VoiceHandle,
};

fn utterance(text: &str) -> Utterance {
    Utterance {
        text: text.to_string(),
        voice: None,
        rate: 1.0,
        pitch: 1.0,
        volume: 1.0,
        lang: LanguageCode::English,
    }
}

#[test]
fn recognizer_fake_records_starts_and_stops() {
    let (mut ports, probes) = fake_ports(vec![], Arc::new(InMemoryPreferenceStore::new()));

    ports.recognizer.start(AttemptId(4), "hi-IN").unwrap();
    ports.recognizer.stop();
    ports.recognizer.stop();

    assert_eq!(probes.recognizer.starts(), vec![(AttemptId(4), "hi-IN".to_string())]);
    assert_eq!(probes.recognizer.stop_count(), 2);
    assert_eq!(probes.recognizer.last_attempt(), Some(AttemptId(4)));
}

#[test]
fn rejected_start_is_not_recorded() {
    let (mut ports, probes) = fake_ports(vec![], Arc::new(InMemoryPreferenceStore::new()));
    probes
        .recognizer
        .reject_next_start(EngineError::Rejected("busy".to_string()));

    let err = ports.recognizer.start(AttemptId(1), "en-US").unwrap_err();
    assert_eq!(err, EngineError::Rejected("busy".to_string()));
    assert_eq!(probes.recognizer.start_count(), 0);

    // Only the next start is rejected.
    ports.recognizer.start(AttemptId(2), "en-US").unwrap();
    assert_eq!(probes.recognizer.start_count(), 1);
}

#[test]
fn synthesizer_fake_serves_configured_voices() {
    let voices = vec![VoiceHandle::named("Samantha", "en-US")];
    let (mut ports, probes) = fake_ports(voices.clone(), Arc::new(InMemoryPreferenceStore::new()));

    assert_eq!(ports.synthesizer.list_voices(), voices);

    probes.synthesizer.set_voices(vec![]);
    assert!(ports.synthesizer.list_voices().is_empty());

    ports.synthesizer.speak(AttemptId(9), &utterance("hello")).unwrap();
    ports.synthesizer.cancel();
    assert_eq!(probes.synthesizer.spoken().len(), 1);
    assert_eq!(probes.synthesizer.cancel_count(), 1);
}

#[test]
fn timer_ops_keep_call_order() {
    let (mut ports, probes) = fake_ports(vec![], Arc::new(InMemoryPreferenceStore::new()));

    ports.timers.arm(TimerToken(1), Duration::from_millis(500));
    ports.timers.cancel(TimerToken(1));
    ports.timers.arm(TimerToken(2), Duration::from_millis(800));

    assert_eq!(
        probes.timers.ops(),
        vec![
            TimerOp::Armed {
                token: TimerToken(1),
                delay: Duration::from_millis(500)
            },
            TimerOp::Cancelled {
                token: TimerToken(1)
            },
            TimerOp::Armed {
                token: TimerToken(2),
                delay: Duration::from_millis(800)
            },
        ]
    );
    assert_eq!(probes.timers.outstanding(), 1);
}

#[test]
fn feedback_and_chat_record_everything() {
    let (ports, probes) = fake_ports(vec![], Arc::new(InMemoryPreferenceStore::new()));

    ports.feedback.notify("boom", Severity::Error);
    ports.feedback.notify("ok", Severity::Info);
    ports.feedback.set_indicator(Indicator::Listening);
    ports.chat.fill_input("hel", false);
    ports.chat.fill_input("hello", true);
    ports.chat.request_send();

    assert_eq!(probes.feedback.errors(), vec!["boom".to_string()]);
    assert_eq!(probes.feedback.last_indicator(), Some(Indicator::Listening));
    assert_eq!(probes.chat.filled().len(), 2);
    assert_eq!(probes.chat.send_count(), 1);
}

#[test]
fn preferences_are_shared_with_the_probe() {
    let (ports, probes) = fake_ports(vec![], Arc::new(InMemoryPreferenceStore::new()));

    ports.preferences.set("mindease_voice_language", "gu").unwrap();

    assert_eq!(
        probes.preferences.get("mindease_voice_language").unwrap().as_deref(),
        Some("gu")
    );
}
