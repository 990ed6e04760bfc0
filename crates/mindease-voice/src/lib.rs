#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod preferences;
pub mod recognition;
pub mod runtime;
pub mod speech;
pub mod text_utils;

// Re-export key types for convenience
pub use catalog::VoiceCatalog;
pub use config::{DeliveryParams, VoiceConfig, VoiceTimings, validate_config};
pub use controller::{
    ControllerEvent, DisabledReason, Phase, TimerPurpose, VoiceCapabilities, VoiceController,
    VoiceStatus,
};
pub use error::{Capability, VoiceError};
pub use preferences::{JsonFilePreferenceStore, StoredPreferences, VoicePreferences};
pub use runtime::{
    ControllerHandle, ControllerMailbox, ControllerSnapshot, TokioTimers, spawn_controller,
};
pub use text_utils::normalize_for_speech;
