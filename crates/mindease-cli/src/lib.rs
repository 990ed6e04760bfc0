#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

// Used by the binary entry point in main.rs
use anyhow as _;
use dotenvy as _;
use tracing_subscriber as _;

pub mod console;
pub mod input;
pub mod parser;

pub use console::{ConsoleChat, ConsoleFeedback, ListeningSlot, console_ports, compose_reply};
pub use input::{ConsoleCommand, ConsoleInput, parse_line};
pub use parser::Cli;
