//! Voice controller configuration and validation.
//!
//! The defaults reproduce the product's tuned timings. All durations are
//! stored as milliseconds so the config can be loaded from JSON.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::VoiceError;

/// Delays the controller applies between attempts, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceTimings {
    /// Grace period between enabling voice mode and opening the microphone.
    pub grace_delay_ms: u64,

    /// Delay before a persisted `enabled` preference re-enables voice mode.
    pub restore_delay_ms: u64,

    /// Pause between a valid final transcript and the chat send request.
    pub send_delay_ms: u64,

    /// Back-off before retrying after a retryable recognition error.
    pub retry_delay_ms: u64,

    /// Restart delay after an attempt ends without a final result.
    pub silence_restart_ms: u64,

    /// Restart delay after speech playback finishes, so the engine's tail
    /// audio does not reach the microphone.
    pub post_speech_restart_ms: u64,

    /// Maximum length of one listening attempt.
    pub listen_timeout_ms: u64,
}

impl Default for VoiceTimings {
    fn default() -> Self {
        Self {
            grace_delay_ms: 500,
            restore_delay_ms: 1000,
            send_delay_ms: 800,
            retry_delay_ms: 2000,
            silence_restart_ms: 1000,
            post_speech_restart_ms: 500,
            listen_timeout_ms: 15_000,
        }
    }
}

impl VoiceTimings {
    pub const fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms)
    }

    pub const fn restore_delay(&self) -> Duration {
        Duration::from_millis(self.restore_delay_ms)
    }

    pub const fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }

    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub const fn silence_restart(&self) -> Duration {
        Duration::from_millis(self.silence_restart_ms)
    }

    pub const fn post_speech_restart(&self) -> Duration {
        Duration::from_millis(self.post_speech_restart_ms)
    }

    pub const fn listen_timeout(&self) -> Duration {
        Duration::from_millis(self.listen_timeout_ms)
    }
}

/// Fixed utterance delivery parameters.
///
/// Slightly slow and a little quiet, so replies read as calm and unhurried.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryParams {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for DeliveryParams {
    fn default() -> Self {
        Self {
            rate: 0.85,
            pitch: 1.0,
            volume: 0.9,
        }
    }
}

/// Full controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub timings: VoiceTimings,
    pub delivery: DeliveryParams,

    /// Final transcripts shorter than this (after trimming) are rejected.
    pub min_transcript_chars: usize,

    /// Consecutive engine-internal recognition failures that disable voice
    /// mode for the rest of the session.
    pub engine_failure_limit: u32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            timings: VoiceTimings::default(),
            delivery: DeliveryParams::default(),
            min_transcript_chars: 3,
            engine_failure_limit: 2,
        }
    }
}

impl VoiceConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, VoiceError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        validate_config(&config)?;
        tracing::info!(path = %path.display(), "Loaded voice config");
        Ok(config)
    }
}

/// Validate a configuration.
pub fn validate_config(config: &VoiceConfig) -> Result<(), VoiceError> {
    if config.timings.listen_timeout_ms == 0 {
        return Err(VoiceError::InvalidConfig(
            "listen_timeout_ms must be greater than zero".to_string(),
        ));
    }

    let delivery = &config.delivery;
    if !(0.1..=10.0).contains(&delivery.rate) {
        return Err(VoiceError::InvalidConfig(format!(
            "rate {} outside 0.1-10.0",
            delivery.rate
        )));
    }
    if !(0.0..=2.0).contains(&delivery.pitch) {
        return Err(VoiceError::InvalidConfig(format!(
            "pitch {} outside 0.0-2.0",
            delivery.pitch
        )));
    }
    if !(0.0..=1.0).contains(&delivery.volume) {
        return Err(VoiceError::InvalidConfig(format!(
            "volume {} outside 0.0-1.0",
            delivery.volume
        )));
    }

    if config.engine_failure_limit == 0 {
        return Err(VoiceError::InvalidConfig(
            "engine_failure_limit must be at least 1".to_string(),
        ));
    }

    Ok(())
}
