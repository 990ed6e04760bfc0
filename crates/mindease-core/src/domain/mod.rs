//! Domain types shared by the controller and its collaborators.
//!
//! These are plain data types with no infrastructure dependencies.

pub mod ids;
pub mod language;
pub mod voice;

pub use ids::{AttemptId, TimerToken};
pub use language::{LanguageCode, UnknownLanguage};
pub use voice::{Utterance, VoiceHandle};
