//! Tokio host for the [`VoiceController`].
//!
//! The controller lives on a single task that drains an unbounded queue, so
//! callbacks are processed one at a time in arrival order. Engine adapters
//! and timers post into the queue through a cloneable [`ControllerMailbox`];
//! the application drives voice mode through a [`ControllerHandle`].

use std::collections::HashMap;
use std::time::Duration;

use mindease_core::{
    AttemptId, LanguageCode, RecognitionEvent, SpeechEvent, TimerPort, TimerToken, VoicePorts,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::VoiceConfig;
use crate::controller::{
    ControllerEvent, Phase, TimerPurpose, VoiceCapabilities, VoiceController, VoiceStatus,
};

// ── Commands ───────────────────────────────────────────────────────

enum Command {
    Event(ControllerEvent),
    Snapshot {
        reply: oneshot::Sender<ControllerSnapshot>,
    },
}

/// Point-in-time copy of the controller's observable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub status: VoiceStatus,
    pub phase: Phase,
    pub enabled: bool,
    pub language: LanguageCode,
    pub pending_timer: Option<TimerPurpose>,
    pub capabilities: VoiceCapabilities,
    pub last_final_transcript: String,
}

impl ControllerSnapshot {
    fn of(controller: &VoiceController) -> Self {
        Self {
            status: controller.status(),
            phase: controller.phase(),
            enabled: controller.is_enabled(),
            language: controller.language(),
            pending_timer: controller.pending_timer(),
            capabilities: controller.capabilities(),
            last_final_transcript: controller.last_final_transcript().to_string(),
        }
    }
}

// ── Mailbox ────────────────────────────────────────────────────────

/// Posts events into the controller's queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ControllerMailbox {
    tx: mpsc::UnboundedSender<Command>,
}

impl ControllerMailbox {
    /// Queue an event. Returns `false` once the controller has stopped.
    pub fn post(&self, event: ControllerEvent) -> bool {
        if self.tx.send(Command::Event(event)).is_err() {
            tracing::debug!("Voice controller queue closed");
            return false;
        }
        true
    }

    /// Queue a recognition engine callback.
    pub fn recognition(&self, attempt: AttemptId, event: RecognitionEvent) -> bool {
        self.post(ControllerEvent::Recognition { attempt, event })
    }

    /// Queue a speech engine callback.
    pub fn speech(&self, attempt: AttemptId, event: SpeechEvent) -> bool {
        self.post(ControllerEvent::Speech { attempt, event })
    }
}

// ── Timers ─────────────────────────────────────────────────────────

/// [`TimerPort`] backed by `tokio::time::sleep`.
///
/// Each armed timer is a task that posts [`ControllerEvent::TimerFired`];
/// cancelling aborts the task. Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TokioTimers {
    mailbox: ControllerMailbox,
    handles: HashMap<TimerToken, JoinHandle<()>>,
}

impl TokioTimers {
    pub fn new(mailbox: ControllerMailbox) -> Self {
        Self {
            mailbox,
            handles: HashMap::new(),
        }
    }
}

impl TimerPort for TokioTimers {
    fn arm(&mut self, token: TimerToken, delay: Duration) {
        self.handles.retain(|_, handle| !handle.is_finished());

        let mailbox = self.mailbox.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            mailbox.post(ControllerEvent::TimerFired(token));
        });
        self.handles.insert(token, handle);
    }

    fn cancel(&mut self, token: TimerToken) {
        if let Some(handle) = self.handles.remove(&token) {
            handle.abort();
        }
    }
}

impl Drop for TokioTimers {
    fn drop(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}

// ── Handle ─────────────────────────────────────────────────────────

/// Application-side handle to a running controller.
#[derive(Debug)]
pub struct ControllerHandle {
    mailbox: ControllerMailbox,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    /// A mailbox for wiring further event sources.
    pub fn mailbox(&self) -> ControllerMailbox {
        self.mailbox.clone()
    }

    pub fn enable(&self) {
        self.mailbox.post(ControllerEvent::EnableRequested);
    }

    pub fn disable(&self) {
        self.mailbox.post(ControllerEvent::DisableRequested);
    }

    pub fn toggle(&self) {
        self.mailbox.post(ControllerEvent::ToggleRequested);
    }

    pub fn speak(&self, text: impl Into<String>) {
        self.mailbox
            .post(ControllerEvent::SpeakRequested(text.into()));
    }

    pub fn set_language(&self, language: LanguageCode) {
        self.mailbox.post(ControllerEvent::LanguageChanged(language));
    }

    pub fn manual_input(&self) {
        self.mailbox.post(ControllerEvent::ManualInput);
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.mailbox
            .post(ControllerEvent::VisibilityChanged { hidden });
    }

    pub fn voices_changed(&self) {
        self.mailbox.post(ControllerEvent::VoicesChanged);
    }

    pub fn capabilities_changed(&self) {
        self.mailbox.post(ControllerEvent::CapabilitiesChanged);
    }

    /// Current controller state, after every event queued before this call
    /// has been handled. `None` once the controller has stopped.
    pub async fn snapshot(&self) -> Option<ControllerSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.mailbox.tx.send(Command::Snapshot { reply }).ok()?;
        rx.await.ok()
    }

    /// Stop the controller and wait for its task to finish.
    pub async fn shutdown(self) {
        self.mailbox.post(ControllerEvent::Shutdown);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Voice controller task failed");
        }
    }
}

/// Build a controller and run it on its own task.
///
/// `make_ports` receives the controller's mailbox so engine adapters and
/// [`TokioTimers`] can post their callbacks. Must be called from within a
/// tokio runtime.
pub fn spawn_controller<F>(config: VoiceConfig, make_ports: F) -> ControllerHandle
where
    F: FnOnce(&ControllerMailbox) -> VoicePorts,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mailbox = ControllerMailbox { tx };

    let ports = make_ports(&mailbox);
    let mut controller = VoiceController::new(config, ports);

    let task = tokio::spawn(async move {
        tracing::debug!("Voice controller task started");
        while let Some(command) = rx.recv().await {
            match command {
                Command::Event(ControllerEvent::Shutdown) => break,
                Command::Event(event) => controller.handle(event),
                Command::Snapshot { reply } => {
                    let _ = reply.send(ControllerSnapshot::of(&controller));
                }
            }
        }
        controller.shutdown();
        tracing::debug!("Voice controller task finished");
    });

    ControllerHandle { mailbox, task }
}
