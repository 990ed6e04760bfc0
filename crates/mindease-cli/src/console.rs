//! Console-backed collaborators for the voice controller.
//!
//! The "recognizer" opens a [`ListeningSlot`] that the stdin loop reads to
//! decide whether a typed line is a transcript. The "synthesizer" prints the
//! utterance and reports it finished after a reading-speed delay. Chat sends
//! are forwarded to the console loop, which composes the reply.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use mindease_core::{
    AttemptId, ChatPort, EngineError, FeedbackSink, Indicator, PreferenceStore, RecognitionEvent,
    Severity, SpeechEvent, SpeechRecognizer, SpeechSynthesizer, TimerPort, TracingFeedback,
    Utterance, VoiceHandle, VoicePorts,
};
use mindease_voice::{ControllerMailbox, TokioTimers};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Time the console synthesizer spends "speaking" each word.
const WORD_DURATION: Duration = Duration::from_millis(250);

// ── Listening slot ─────────────────────────────────────────────────

/// The recognition attempt the console is currently taking lines for.
#[derive(Debug, Clone, Default)]
pub struct ListeningSlot(Arc<Mutex<Option<AttemptId>>>);

impl ListeningSlot {
    pub fn current(&self) -> Option<AttemptId> {
        self.0.lock().map_or(None, |slot| *slot)
    }

    /// Close the slot, returning the attempt it held.
    pub fn take(&self) -> Option<AttemptId> {
        self.0.lock().map_or(None, |mut slot| slot.take())
    }

    fn set(&self, attempt: Option<AttemptId>) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = attempt;
        }
    }
}

// ── Engines ────────────────────────────────────────────────────────

struct ConsoleRecognizer {
    slot: ListeningSlot,
    mailbox: ControllerMailbox,
}

impl SpeechRecognizer for ConsoleRecognizer {
    fn is_available(&self) -> bool {
        true
    }

    fn start(&mut self, attempt: AttemptId, language_tag: &str) -> Result<(), EngineError> {
        self.slot.set(Some(attempt));
        println!("🎤 Listening ({language_tag})... type what you would say");
        self.mailbox.recognition(attempt, RecognitionEvent::Started);
        Ok(())
    }

    fn stop(&mut self) {
        self.slot.set(None);
    }
}

struct ConsoleSynthesizer {
    mailbox: ControllerMailbox,
    voices: Vec<VoiceHandle>,
    playing: Option<JoinHandle<()>>,
}

impl SpeechSynthesizer for ConsoleSynthesizer {
    fn is_available(&self) -> bool {
        true
    }

    fn speak(&mut self, attempt: AttemptId, utterance: &Utterance) -> Result<(), EngineError> {
        let voice = utterance
            .voice
            .as_ref()
            .map_or("default voice", |v| v.name.as_str());
        println!("🔊 [{voice}] {}", utterance.text);

        let words = u32::try_from(utterance.text.split_whitespace().count()).unwrap_or(u32::MAX);
        let duration = WORD_DURATION.saturating_mul(words).div_f32(utterance.rate.max(0.1));

        let mailbox = self.mailbox.clone();
        mailbox.speech(attempt, SpeechEvent::Started);
        self.playing = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            mailbox.speech(attempt, SpeechEvent::Ended);
        }));
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(playing) = self.playing.take() {
            playing.abort();
            println!("🔇 (stopped)");
        }
    }

    fn list_voices(&self) -> Vec<VoiceHandle> {
        self.voices.clone()
    }
}

/// Voices the console pretends to have installed.
pub fn console_voices() -> Vec<VoiceHandle> {
    vec![
        VoiceHandle::named("Samantha", "en-US"),
        VoiceHandle::named("Google UK English Female", "en-GB"),
        VoiceHandle::named("Rishi", "en-IN"),
        VoiceHandle::named("Lekha", "hi-IN"),
        VoiceHandle::named("Google ગુજરાતી", "gu-IN"),
    ]
}

// ── Chat + feedback ────────────────────────────────────────────────

/// Chat input box. Sent messages go to the console loop over a channel.
#[derive(Debug)]
pub struct ConsoleChat {
    input: Mutex<String>,
    outbox: mpsc::UnboundedSender<String>,
}

impl ConsoleChat {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (outbox, rx) = mpsc::unbounded_channel();
        let chat = Self {
            input: Mutex::new(String::new()),
            outbox,
        };
        (chat, rx)
    }
}

impl ChatPort for ConsoleChat {
    fn fill_input(&self, text: &str, is_final: bool) {
        if let Ok(mut input) = self.input.lock() {
            text.clone_into(&mut input);
        }
        if is_final {
            println!("✏️  {text}");
        }
    }

    fn request_send(&self) {
        let message = match self.input.lock() {
            Ok(mut input) => std::mem::take(&mut *input),
            Err(e) => {
                tracing::warn!(error = %e, "Chat input unavailable");
                return;
            }
        };
        if message.is_empty() {
            return;
        }
        if self.outbox.send(message).is_err() {
            tracing::debug!("Console loop gone, message dropped");
        }
    }
}

/// Prints notifications; indicator changes go to the log only.
#[derive(Debug, Default)]
pub struct ConsoleFeedback {
    last: Mutex<Option<Indicator>>,
    log: TracingFeedback,
}

impl FeedbackSink for ConsoleFeedback {
    fn notify(&self, message: &str, severity: Severity) {
        let icon = match severity {
            Severity::Info => "ℹ️ ",
            Severity::Success => "✅",
            Severity::Error => "⚠️ ",
        };
        println!("{icon} {message}");
        self.log.notify(message, severity);
    }

    fn set_indicator(&self, indicator: Indicator) {
        let Ok(mut last) = self.last.lock() else {
            return;
        };
        if *last == Some(indicator) {
            return;
        }
        *last = Some(indicator);
        self.log.set_indicator(indicator);
    }
}

/// Wire console engines, tokio timers and `preferences` to the mailbox.
pub fn console_ports(
    mailbox: &ControllerMailbox,
    slot: ListeningSlot,
    chat: Arc<ConsoleChat>,
    preferences: Arc<dyn PreferenceStore>,
) -> VoicePorts {
    let timers: Box<dyn TimerPort> = Box::new(TokioTimers::new(mailbox.clone()));
    VoicePorts {
        recognizer: Box::new(ConsoleRecognizer {
            slot,
            mailbox: mailbox.clone(),
        }),
        synthesizer: Box::new(ConsoleSynthesizer {
            mailbox: mailbox.clone(),
            voices: console_voices(),
            playing: None,
        }),
        timers,
        preferences,
        feedback: Arc::new(ConsoleFeedback::default()),
        chat,
    }
}

// ── Replies ────────────────────────────────────────────────────────

const REPLIES: [&str; 4] = [
    "Thank you for sharing that with me. **How long** have you been feeling this way? 💙",
    "That sounds really hard. Would you like to try a slow breathing exercise together?",
    "- You are not alone in this.\n- It is okay to take things one step at a time.",
    "I hear you. What is one small thing that might help you feel a little better today? 🌱",
];

/// Canned supportive reply for the `turn`-th message.
pub fn compose_reply(message: &str, turn: usize) -> String {
    if message.trim_end().ends_with('?') {
        return "That is a good question. Let's think about it together, step by step.".to_string();
    }
    REPLIES[turn % REPLIES.len()].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_tracks_current_attempt() {
        let slot = ListeningSlot::default();
        assert_eq!(slot.current(), None);
        slot.set(Some(AttemptId(3)));
        assert_eq!(slot.clone().current(), Some(AttemptId(3)));
        assert_eq!(slot.take(), Some(AttemptId(3)));
        assert_eq!(slot.current(), None);
    }

    #[test]
    fn send_forwards_the_final_input_once() {
        let (chat, mut rx) = ConsoleChat::new();
        chat.fill_input("I feel", false);
        chat.fill_input("I feel tired", true);
        chat.request_send();
        chat.request_send();

        assert_eq!(rx.try_recv().ok().as_deref(), Some("I feel tired"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn replies_rotate() {
        assert_ne!(compose_reply("hello", 0), compose_reply("hello", 1));
        assert_eq!(compose_reply("hello", 0), compose_reply("hello", REPLIES.len()));
        assert!(compose_reply("what should I do?", 0).starts_with("That is a good question"));
    }

    #[test]
    fn indicator_changes_are_deduplicated() {
        let feedback = ConsoleFeedback::default();
        feedback.set_indicator(Indicator::Listening);
        feedback.set_indicator(Indicator::Listening);
        assert_eq!(*feedback.last.lock().unwrap(), Some(Indicator::Listening));
    }
}
