//! Stdin line parsing.

use mindease_core::{LanguageCode, RecognitionErrorKind};

/// A slash command typed on the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    ToggleVoice,
    Language(LanguageCode),
    Hide,
    Show,
    /// End the listening attempt without a result.
    Silence,
    /// Fail the listening attempt with an engine error code.
    Error(RecognitionErrorKind),
    Status,
    Help,
    Quit,
}

/// One parsed line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Empty,
    Command(ConsoleCommand),
    /// Free text: a transcript while listening, a typed message otherwise.
    Text(String),
    /// A slash command that could not be understood.
    Invalid(String),
}

pub fn parse_line(line: &str) -> ConsoleInput {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleInput::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ConsoleInput::Text(line.to_string());
    };

    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, arg)| (name, arg.trim()));

    let parsed = match (name, arg) {
        ("voice", "") => ConsoleCommand::ToggleVoice,
        ("lang", code) if !code.is_empty() => match code.parse() {
            Ok(language) => ConsoleCommand::Language(language),
            Err(e) => return ConsoleInput::Invalid(format!("{e}")),
        },
        ("hide", "") => ConsoleCommand::Hide,
        ("show", "") => ConsoleCommand::Show,
        ("silence", "") => ConsoleCommand::Silence,
        ("error", code) if !code.is_empty() => ConsoleCommand::Error(code.into()),
        ("status", "") => ConsoleCommand::Status,
        ("help", "") => ConsoleCommand::Help,
        ("quit" | "exit", "") => ConsoleCommand::Quit,
        _ => return ConsoleInput::Invalid(format!("Unknown command: /{command}")),
    };
    ConsoleInput::Command(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_trimmed() {
        assert_eq!(
            parse_line("  I feel anxious today \n"),
            ConsoleInput::Text("I feel anxious today".to_string())
        );
        assert_eq!(parse_line("   "), ConsoleInput::Empty);
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(
            parse_line("/lang gu"),
            ConsoleInput::Command(ConsoleCommand::Language(LanguageCode::Gujarati))
        );
        assert_eq!(
            parse_line("/error not-allowed"),
            ConsoleInput::Command(ConsoleCommand::Error(RecognitionErrorKind::NotAllowed))
        );
        assert_eq!(parse_line("/quit"), ConsoleInput::Command(ConsoleCommand::Quit));
    }

    #[test]
    fn bad_commands_are_reported() {
        assert!(matches!(parse_line("/lang"), ConsoleInput::Invalid(_)));
        assert!(matches!(parse_line("/lang fr"), ConsoleInput::Invalid(_)));
        assert!(matches!(parse_line("/dance"), ConsoleInput::Invalid(_)));
    }
}
