//! Line-oriented input and plain-text rendering.
//!
//! Input grammar, one command per line:
//!
//! - `key=value` sets a registration field
//! - `-key` clears one
//! - `submit` sends the registration
//! - `help` lists the commands
//! - `quit` (or `exit`) stops the client

use client_core::sync::SubmitOutcome;

use models::{LeaderBoardEntry, UiState};

use serde_json::Value;

pub const HELP_TEXT: &str = "\
Commands:
  key=value   set a registration field (e.g. name=Ada)
  -key        clear a registration field
  submit      send the registration
  help        show this text
  quit        exit";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    SetField { key: String, value: Value },
    ClearField { key: String },
    Submit,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Parse one line of user input.
///
/// A field value that is valid JSON (`42`, `true`, `"quoted"`) keeps its JSON
/// type. Anything else is taken as a plain string.
pub fn parse_command(line: &str) -> ConsoleCommand {
    let line = line.trim();

    match line {
        "" => return ConsoleCommand::Empty,
        "submit" => return ConsoleCommand::Submit,
        "help" | "?" => return ConsoleCommand::Help,
        "quit" | "exit" => return ConsoleCommand::Quit,
        _ => {}
    }

    if let Some(key) = line.strip_prefix('-') {
        let key = key.trim();
        if key.is_empty() {
            return ConsoleCommand::Unknown(line.to_string());
        }
        return ConsoleCommand::ClearField {
            key: key.to_string(),
        };
    }

    match line.split_once('=') {
        Some((key, raw)) if !key.trim().is_empty() => ConsoleCommand::SetField {
            key: key.trim().to_string(),
            value: parse_value(raw.trim()),
        },
        _ => ConsoleCommand::Unknown(line.to_string()),
    }
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Render the UI state as a small text block.
pub fn render(state: &UiState) -> String {
    let mut out = String::new();

    let connection = if state.connected {
        "connected"
    } else {
        "disconnected"
    };
    let phase = if state.game_in_progress {
        "game in progress"
    } else {
        "registration open"
    };
    let form = if state.form_disabled {
        "submitted"
    } else {
        "open"
    };

    out.push_str(&format!("[{connection}] {phase} | form: {form}\n"));

    if state.leader_board.is_empty() {
        out.push_str("  (no standings yet)");
        return out;
    }

    let rows: Vec<String> = state
        .leader_board
        .iter()
        .enumerate()
        .map(|(rank, entry)| format!("  {:>2}. {}", rank + 1, render_entry(entry)))
        .collect();
    out.push_str(&rows.join("\n"));

    out
}

fn render_entry(entry: &LeaderBoardEntry) -> String {
    match (entry.name(), entry.score()) {
        (Some(name), Some(score)) => format!("{name:<20} {score}"),
        (Some(name), None) => name.to_string(),
        _ => entry.as_value().to_string(),
    }
}

/// One-line feedback for a submit attempt.
pub fn describe_outcome(outcome: SubmitOutcome) -> &'static str {
    match outcome {
        SubmitOutcome::Sent => "Registration sent",
        SubmitOutcome::Dropped => "Not connected; registration was not delivered",
        SubmitOutcome::Rejected => "Nothing to submit; set a field first (e.g. name=Ada)",
        SubmitOutcome::AlreadySubmitted => "Registration already submitted",
    }
}
