//! Tests for the tokio host: queue ordering, real timers on a paused clock
//! and shutdown.

use std::sync::Arc;
use std::time::Duration;

use mindease_core::testing::{FakeProbes, fake_ports};
use mindease_core::{InMemoryPreferenceStore, RecognitionEvent, SpeechEvent, VoiceHandle};
use mindease_voice::{
    ControllerHandle, Phase, TimerPurpose, TokioTimers, VoiceConfig, VoiceStatus, spawn_controller,
};

fn spawn() -> (ControllerHandle, FakeProbes) {
    let (ports, probes) = fake_ports(
        vec![VoiceHandle::named("Samantha", "en-US")],
        Arc::new(InMemoryPreferenceStore::new()),
    );
    let handle = spawn_controller(VoiceConfig::default(), move |mailbox| {
        let mut ports = ports;
        ports.timers = Box::new(TokioTimers::new(mailbox.clone()));
        ports
    });
    (handle, probes)
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn grace_timer_starts_listening() {
    let (handle, probes) = spawn();

    handle.enable();
    sleep_ms(400).await;
    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.enabled);
    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(snapshot.pending_timer, Some(TimerPurpose::GraceStart));

    sleep_ms(200).await;
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.status, VoiceStatus::Listening);
    assert_eq!(probes.recognizer.start_count(), 1);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn transcript_is_sent_through_the_queue() {
    let (handle, probes) = spawn();
    let mailbox = handle.mailbox();

    handle.enable();
    sleep_ms(600).await;
    let attempt = probes.recognizer.last_attempt().unwrap();

    assert!(mailbox.recognition(
        attempt,
        RecognitionEvent::Result {
            transcript: "  I feel okay today ".to_string(),
            is_final: true,
        },
    ));
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.last_final_transcript, "I feel okay today");
    assert_eq!(snapshot.pending_timer, Some(TimerPurpose::SendTranscript));

    sleep_ms(900).await;
    assert_eq!(probes.chat.send_count(), 1);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn listening_resumes_after_reply() {
    let (handle, probes) = spawn();
    let mailbox = handle.mailbox();

    handle.enable();
    sleep_ms(600).await;
    handle.speak("Take a slow breath with me.");
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, Phase::Speaking);
    assert_eq!(probes.recognizer.stop_count(), 1);

    let attempt = probes.synthesizer.last_attempt().unwrap();
    mailbox.speech(attempt, SpeechEvent::Started);
    mailbox.speech(attempt, SpeechEvent::Ended);
    sleep_ms(600).await;

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, Phase::Listening);
    assert_eq!(probes.recognizer.start_count(), 2);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn silent_listening_times_out() {
    let (handle, probes) = spawn();

    handle.enable();
    sleep_ms(16_000).await;

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(snapshot.pending_timer, Some(TimerPurpose::SilenceRestart));
    assert_eq!(probes.recognizer.stop_count(), 1);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn disable_cancels_the_armed_timer() {
    let (handle, probes) = spawn();

    handle.enable();
    handle.disable();
    sleep_ms(5_000).await;

    let snapshot = handle.snapshot().await.unwrap();
    assert!(!snapshot.enabled);
    assert_eq!(snapshot.pending_timer, None);
    assert_eq!(probes.recognizer.start_count(), 0);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn mailbox_closes_after_shutdown() {
    let (handle, probes) = spawn();
    let mailbox = handle.mailbox();

    handle.enable();
    sleep_ms(600).await;
    handle.shutdown().await;

    assert!(!mailbox.post(mindease_voice::ControllerEvent::EnableRequested));
    assert_eq!(probes.recognizer.stop_count(), 1);
    sleep_ms(20_000).await;
    assert_eq!(probes.recognizer.start_count(), 1);
}
