//! Text preprocessing for speech synthesis.
//!
//! Reply text arrives as lightly formatted chat markdown with the odd emoji.
//! [`normalize_for_speech`] turns it into plain text that a synthesis engine
//! reads naturally.

/// Symbols spoken as the word "heart".
const HEART_SYMBOLS: &[char] = &['💙', '❤', '💚', '💛', '💜', '🧡'];

/// Emotive symbols dropped without a spoken replacement.
const SILENT_SYMBOLS: &[char] = &[
    '😊', '😀', '😃', '😄', '😁', '🙂', // happy
    '😢', '😭', '😔', '☹', '🙁', // sad
    '😰', '😨', '😱', '😟', '😕', // anxious
    '😡', '😠', '🤬', '😤', // angry
    '🌟', '⭐', '✨', // sparkle
    '🤗', '🫂', // hugs
];

/// Punctuation kept because engines turn it into pauses or intonation.
const SPEAKABLE_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '(', ')', '-'];

/// Normalize reply text into speech-safe plain text.
///
/// Handles:
/// - Emphasis markup (`*`, `#`, `_`, `` ` ``) → removed
/// - Markdown links \[text\](url) → text
/// - Bare URLs → "link"
/// - Line and paragraph breaks → ". "
/// - List bullets (`•`, `-`, `*`, `+`, `1.`) → removed
/// - Hearts → "heart"; other emotive symbols → removed
/// - Anything outside letters, digits, whitespace and `.,!?;:()-` → removed
/// - Whitespace runs → single space
///
/// Deterministic and idempotent: normalizing the output again returns it
/// unchanged.
#[must_use]
pub fn normalize_for_speech(text: &str) -> String {
    let joined = text
        .lines()
        .map(|line| strip_list_marker(line).trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(". ");

    let text = strip_links(&joined);
    let text = replace_urls(&text);
    let text = speakable_symbols(&text);
    let text = collapse_whitespace(&text);

    // Dropping symbols can expose a leading "- " or "1. " that the line pass
    // never saw; strip it here so a second pass has nothing left to do.
    strip_list_marker(&text).to_string()
}

// ── Internal helpers ───────────────────────────────────────────────

/// Strip any run of leading list markers (and the indentation around them).
fn strip_list_marker(line: &str) -> &str {
    let mut rest = line.trim_start();

    loop {
        let next = rest
            .strip_prefix("- ")
            .or_else(|| rest.strip_prefix("* "))
            .or_else(|| rest.strip_prefix("+ "))
            .or_else(|| rest.strip_prefix('•'))
            .or_else(|| strip_numbered_marker(rest));

        match next {
            Some(after) => rest = after.trim_start(),
            None => return rest,
        }
    }
}

/// `1. item` / `2) item` → `item`.
fn strip_numbered_marker(text: &str) -> Option<&str> {
    let digits = text.find(|c: char| !c.is_ascii_digit())?;
    if digits == 0 {
        return None;
    }
    let after = &text[digits..];
    after.strip_prefix(". ").or_else(|| after.strip_prefix(") "))
}

fn strip_links(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '[' {
            let link_text: String = chars.by_ref().take_while(|&c| c != ']').collect();
            if chars.peek() == Some(&'(') {
                chars.next(); // consume '('
                let _url: String = chars.by_ref().take_while(|&c| c != ')').collect();
                result.push_str(&link_text);
                continue;
            }
            // Not a link; the brackets are dropped later anyway
            result.push('[');
            result.push_str(&link_text);
            result.push(']');
        } else {
            result.push(c);
        }
    }

    result
}

/// Replace `http://…` / `https://…` runs (up to the next whitespace) with "link".
fn replace_urls(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = [rest.find("http://"), rest.find("https://")]
        .into_iter()
        .flatten()
        .min()
    {
        result.push_str(&rest[..start]);
        result.push_str("link");

        let url = &rest[start..];
        let end = url.find(char::is_whitespace).unwrap_or(url.len());
        rest = &url[end..];
    }

    result.push_str(rest);
    result
}

/// Map emotive symbols and drop every character an engine would misread.
fn speakable_symbols(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            // emphasis markup and bullets
            '*' | '#' | '_' | '`' | '•' => {}
            c if HEART_SYMBOLS.contains(&c) => result.push_str(" heart "),
            c if SILENT_SYMBOLS.contains(&c) => {}
            c if is_speakable(c) => result.push(c),
            _ => {}
        }
    }

    result
}

fn is_speakable(c: char) -> bool {
    c.is_alphanumeric()
        || c.is_whitespace()
        || SPEAKABLE_PUNCTUATION.contains(&c)
        || is_indic_script(c)
}

/// Devanagari and Gujarati blocks, including vowel signs and the danda,
/// which `char::is_alphanumeric` does not fully cover.
fn is_indic_script(c: char) -> bool {
    matches!(c, '\u{0900}'..='\u{097F}' | '\u{0A80}'..='\u{0AFF}')
}

fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !prev_space {
                result.push(' ');
                prev_space = true;
            }
        } else {
            result.push(c);
            prev_space = false;
        }
    }

    result.trim().to_string()
}
