//! Synthesis voice catalog and ranked voice selection.
//!
//! Selection is a small priority table rather than branching code. Voices are
//! scanned in catalog order and each voice is checked against every rule; a
//! match only replaces the current best when its priority is strictly lower,
//! so the first voice found at a given priority wins ties.

use mindease_core::{LanguageCode, VoiceHandle};

/// Name markers of high-quality voices, accepted for any language.
const PREMIUM_MARKERS: &[&str] = &["premium", "neural", "enhanced"];

/// Preferred voice names for one language tag.
struct CuratedVoices {
    tag_prefix: &'static str,
    names: &'static [&'static str],
}

const EN_US: CuratedVoices = CuratedVoices {
    tag_prefix: "en-US",
    names: &["Samantha", "Alex", "Victoria", "Ava", "Google US English"],
};

const EN_GB: CuratedVoices = CuratedVoices {
    tag_prefix: "en-GB",
    names: &["Daniel", "Kate", "Serena", "Google UK English"],
};

const EN_AU: CuratedVoices = CuratedVoices {
    tag_prefix: "en-AU",
    names: &["Karen", "Google Australian English"],
};

const HI_IN: CuratedVoices = CuratedVoices {
    tag_prefix: "hi-IN",
    names: &["Google हिन्दी", "Microsoft Hemant", "Lekha"],
};

const GU_IN: CuratedVoices = CuratedVoices {
    tag_prefix: "gu-IN",
    names: &["Google ગુજરાતી"],
};

fn curated_for(language: LanguageCode) -> &'static [CuratedVoices] {
    match language {
        LanguageCode::Auto | LanguageCode::English => &[EN_US, EN_GB, EN_AU],
        LanguageCode::Hindi => &[HI_IN],
        LanguageCode::Gujarati => &[GU_IN],
        LanguageCode::Hinglish => &[],
    }
}

// ── Rules ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum VoiceMatch {
    /// Name contains any marker (case-insensitive), any language.
    NameMarker(&'static [&'static str]),
    /// Tag prefix plus a curated name substring (case-insensitive).
    CuratedName {
        tag_prefix: &'static str,
        names: &'static [&'static str],
    },
    /// Tag prefix alone.
    TagPrefix(&'static str),
}

#[derive(Debug, Clone, Copy)]
struct VoiceRule {
    priority: u8,
    matcher: VoiceMatch,
}

impl VoiceRule {
    fn matches(&self, voice: &VoiceHandle) -> bool {
        match self.matcher {
            VoiceMatch::NameMarker(markers) => name_contains_any(&voice.name, markers),
            VoiceMatch::CuratedName { tag_prefix, names } => {
                has_tag_prefix(&voice.lang, tag_prefix) && name_contains_any(&voice.name, names)
            }
            VoiceMatch::TagPrefix(tag_prefix) => has_tag_prefix(&voice.lang, tag_prefix),
        }
    }
}

/// Build the ordered rule table for a requested language.
fn rules_for(language: LanguageCode) -> Vec<VoiceRule> {
    let curated = curated_for(language);
    let mut rules = Vec::with_capacity(curated.len() + 3);

    rules.push(VoiceRule {
        priority: 1,
        matcher: VoiceMatch::NameMarker(PREMIUM_MARKERS),
    });

    rules.extend(curated.iter().map(|c| VoiceRule {
        priority: 2,
        matcher: VoiceMatch::CuratedName {
            tag_prefix: c.tag_prefix,
            names: c.names,
        },
    }));

    if curated.is_empty() {
        rules.push(VoiceRule {
            priority: 3,
            matcher: VoiceMatch::TagPrefix(language.engine_tag()),
        });
    }

    rules.push(VoiceRule {
        priority: 4,
        matcher: VoiceMatch::TagPrefix("en"),
    });

    rules
}

fn name_contains_any(name: &str, needles: &[&str]) -> bool {
    let name = name.to_lowercase();
    needles
        .iter()
        .any(|needle| name.contains(&needle.to_lowercase()))
}

fn has_tag_prefix(tag: &str, prefix: &str) -> bool {
    tag.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

// ── Catalog ────────────────────────────────────────────────────────

/// The synthesis engine's current voice list.
#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    voices: Vec<VoiceHandle>,
}

impl VoiceCatalog {
    pub const fn new() -> Self {
        Self { voices: Vec::new() }
    }

    /// Replace the list with the engine's latest snapshot.
    pub fn refresh(&mut self, voices: Vec<VoiceHandle>) {
        tracing::debug!(count = voices.len(), "Voice catalog refreshed");
        self.voices = voices;
    }

    pub fn voices(&self) -> &[VoiceHandle] {
        &self.voices
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Pick the best voice for `language`.
    ///
    /// Falls back to the first entry when no rule matches; returns `None`
    /// only for an empty catalog, leaving the engine on its default voice.
    pub fn select(&self, language: LanguageCode) -> Option<VoiceHandle> {
        let rules = rules_for(language);
        let mut best: Option<(&VoiceHandle, u8)> = None;

        for voice in &self.voices {
            for rule in &rules {
                let improves = best.is_none_or(|(_, priority)| rule.priority < priority);
                if improves && rule.matches(voice) {
                    best = Some((voice, rule.priority));
                }
            }
        }

        let chosen = best.map(|(voice, _)| voice).or_else(|| self.voices.first());
        if let Some(voice) = chosen {
            tracing::debug!(
                voice = %voice.name,
                lang = %voice.lang,
                requested = %language,
                "Selected synthesis voice"
            );
        }
        chosen.cloned()
    }
}
