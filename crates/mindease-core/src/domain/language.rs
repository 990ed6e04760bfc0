//! Conversation language codes.
//!
//! The chat client offers a fixed set of languages plus an `auto` sentinel.
//! Each code maps to the tag handed to the speech engines; `auto` and any
//! unrecognised code fall back to US English.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Language selected for recognition and synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LanguageCode {
    /// Let the reply service detect the language; engines use US English.
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "gu")]
    Gujarati,
    /// Romanised Hindi/English mix, spoken with an Indian English voice.
    #[serde(rename = "hinglish")]
    Hinglish,
}

/// A language code string that is not one of the supported values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported language code: {0}")]
pub struct UnknownLanguage(pub String);

impl LanguageCode {
    /// Every supported code, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Auto,
        Self::English,
        Self::Hindi,
        Self::Gujarati,
        Self::Hinglish,
    ];

    /// Stable short code persisted in preferences (`"en"`, `"hi"`, …).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Gujarati => "gu",
            Self::Hinglish => "hinglish",
        }
    }

    /// BCP-47 tag passed to the speech engines.
    #[must_use]
    pub const fn engine_tag(self) -> &'static str {
        match self {
            Self::Auto | Self::English => "en-US",
            Self::Hindi => "hi-IN",
            Self::Gujarati => "gu-IN",
            Self::Hinglish => "en-IN",
        }
    }

    /// Parse a persisted code, falling back to [`LanguageCode::Auto`].
    #[must_use]
    pub fn from_code_or_auto(code: &str) -> Self {
        code.parse().unwrap_or_else(|e: UnknownLanguage| {
            tracing::warn!(error = %e, "Falling back to automatic language");
            Self::Auto
        })
    }
}

impl FromStr for LanguageCode {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code() == normalized)
            .ok_or(UnknownLanguage(normalized))
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
