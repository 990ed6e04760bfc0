//! UI feedback sink port: toast notifications and listening/speaking indicators.

use serde::{Deserialize, Serialize};

/// Notification severity, mapped by the UI to a toast style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// Visual indicator shown next to the chat input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    /// Voice idle; the toggle shows whether voice mode is on.
    Idle { voice_enabled: bool },
    Listening,
    Speaking,
    /// Playback paused by the engine.
    Paused,
}

/// Fire-and-forget UI feedback.
pub trait FeedbackSink: Send + Sync {
    /// Show a human-readable notification.
    fn notify(&self, message: &str, severity: Severity);

    /// Update the voice indicator.
    fn set_indicator(&self, indicator: Indicator);
}

/// Feedback sink that forwards everything to `tracing`.
///
/// Used by headless contexts with no UI attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFeedback;

impl FeedbackSink for TracingFeedback {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => tracing::warn!(message, "voice notification"),
            Severity::Info | Severity::Success => tracing::info!(message, "voice notification"),
        }
    }

    fn set_indicator(&self, indicator: Indicator) {
        tracing::debug!(?indicator, "voice indicator");
    }
}
