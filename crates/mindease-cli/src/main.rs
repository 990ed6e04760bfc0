//! CLI entry point - the composition root.
//!
//! Logging, `.env`, arguments, config and the preference file are set up
//! here; everything else lives in the library crates.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use mindease_cli::{
    Cli, ConsoleChat, ConsoleCommand, ConsoleInput, ListeningSlot, compose_reply, console_ports,
    parse_line,
};
use mindease_core::{PreferenceStore, RecognitionEvent};
use mindease_voice::{
    ControllerHandle, JsonFilePreferenceStore, VoiceConfig, spawn_controller, validate_config,
};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<VoiceConfig> {
    let Some(path) = path else {
        return Ok(VoiceConfig::default());
    };
    let config = VoiceConfig::from_json_file(path)
        .with_context(|| format!("Failed to load voice config from {}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

fn print_help() {
    println!("MindEase console. Type a message, or:");
    println!("  /voice           toggle voice mode");
    println!("  /lang <code>     auto, en, hi, gu, hinglish");
    println!("  /hide, /show     background / foreground the page");
    println!("  /silence         end listening without a result");
    println!("  /error <code>    fail listening (no-speech, network, not-allowed, ...)");
    println!("  /status          show controller state");
    println!("  /quit            exit");
}

/// Handle one stdin line. Returns `false` when the user asked to quit.
async fn on_line(
    line: &str,
    handle: &ControllerHandle,
    slot: &ListeningSlot,
    turn: &mut usize,
) -> bool {
    let mailbox = handle.mailbox();
    match parse_line(line) {
        ConsoleInput::Empty => {}
        ConsoleInput::Invalid(reason) => println!("{reason} (try /help)"),
        ConsoleInput::Text(text) => {
            if let Some(attempt) = slot.take() {
                mailbox.recognition(
                    attempt,
                    RecognitionEvent::Result {
                        transcript: text,
                        is_final: true,
                    },
                );
            } else {
                handle.manual_input();
                println!("you> {text}");
                handle.speak(compose_reply(&text, *turn));
                *turn += 1;
            }
        }
        ConsoleInput::Command(command) => match command {
            ConsoleCommand::ToggleVoice => handle.toggle(),
            ConsoleCommand::Language(language) => {
                handle.set_language(language);
                println!("Language set to {language}");
            }
            ConsoleCommand::Hide => handle.set_hidden(true),
            ConsoleCommand::Show => handle.set_hidden(false),
            ConsoleCommand::Silence => {
                if let Some(attempt) = slot.take() {
                    mailbox.recognition(attempt, RecognitionEvent::Ended);
                }
            }
            ConsoleCommand::Error(kind) => {
                if let Some(attempt) = slot.take() {
                    mailbox.recognition(attempt, RecognitionEvent::Error(kind));
                } else {
                    println!("Not listening right now");
                }
            }
            ConsoleCommand::Status => match handle.snapshot().await {
                Some(snapshot) => println!("{snapshot:#?}"),
                None => println!("Voice controller stopped"),
            },
            ConsoleCommand::Help => print_help(),
            ConsoleCommand::Quit => return false,
        },
    }
    true
}

async fn run_console(
    handle: &ControllerHandle,
    slot: &ListeningSlot,
    mut sent: mpsc::UnboundedReceiver<String>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut turn = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if !on_line(&line, handle, slot, &mut turn).await {
                    break;
                }
            }
            Some(message) = sent.recv() => {
                println!("you> {message}");
                handle.speak(compose_reply(&message, turn));
                turn += 1;
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env first so RUST_LOG and MINDEASE_PREFS can come from it
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let prefs_path = cli
        .prefs
        .clone()
        .unwrap_or_else(JsonFilePreferenceStore::default_path);
    let store = JsonFilePreferenceStore::open(prefs_path.clone())
        .with_context(|| format!("Failed to open preferences at {}", prefs_path.display()))?;
    tracing::info!(path = %store.path().display(), "Using preference file");
    let preferences: Arc<dyn PreferenceStore> = Arc::new(store);

    let slot = ListeningSlot::default();
    let (chat, sent) = ConsoleChat::new();
    let chat = Arc::new(chat);

    let handle = spawn_controller(config, |mailbox| {
        console_ports(mailbox, slot.clone(), chat, preferences)
    });

    if let Some(language) = cli.language {
        handle.set_language(language);
    }
    if cli.voice {
        handle.enable();
    }

    print_help();
    let result = run_console(&handle, &slot, sent).await;
    handle.shutdown().await;
    result
}
