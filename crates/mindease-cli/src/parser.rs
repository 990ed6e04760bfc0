//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use mindease_core::LanguageCode;

/// Console voice loop for the MindEase chat client.
#[derive(Debug, Parser)]
#[command(name = "mindease")]
#[command(about = "Talk to MindEase from the terminal with voice mode")]
#[command(version)]
pub struct Cli {
    /// JSON file with voice timings and delivery settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Preference file (defaults to the platform data directory)
    #[arg(long, env = "MINDEASE_PREFS")]
    pub prefs: Option<PathBuf>,

    /// Conversation language: auto, en, hi, gu or hinglish
    #[arg(long)]
    pub language: Option<LanguageCode>,

    /// Switch voice mode on at startup
    #[arg(long)]
    pub voice: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn language_and_paths() {
        let cli = Cli::parse_from([
            "mindease",
            "--language",
            "hi",
            "--config",
            "/tmp/voice.json",
            "--voice",
        ]);
        assert_eq!(cli.language, Some(LanguageCode::Hindi));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/voice.json")));
        assert!(cli.voice);
    }

    #[test]
    fn unknown_language_is_rejected() {
        assert!(Cli::try_parse_from(["mindease", "--language", "klingon"]).is_err());
    }
}
