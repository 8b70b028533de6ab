use leaderboard::console::{ConsoleCommand, HELP_TEXT, describe_outcome, parse_command, render};
use leaderboard::error::LeaderboardError;
use leaderboard::logger::initialize as LoggerInitialize;

use client_core::client::{ClientHandle, LeaderboardClient};
use client_core::config::ClientConfig;

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::path::PathBuf;

use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tokio::signal::ctrl_c;
use tokio::spawn as TokioSpawn;

const APP_DIR_NAME: &str = "leaderboard";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), LeaderboardError> {
    let log_dir = dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join("logs"))
        .ok_or_else(|| LeaderboardError::Leaderboard {
            message: String::from("Failed to resolve local data directory"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    create_dir_all(&log_dir).map_err(|e| LeaderboardError::Leaderboard {
        message: format!("Failed to create log directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Logger first so config problems are recorded
    LoggerInitialize(&log_dir)?;

    info!("Leaderboard client starting");
    info!("Log directory: {}", log_dir.display());

    let config = load_config(dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME)));

    let client = LeaderboardClient::start(&config).map_err(|e| LeaderboardError::Core {
        message: format!("Failed to start client: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let renderer = TokioSpawn(render_changes(client.clone()));

    println!("{HELP_TEXT}");
    let result = read_commands(&client).await;

    renderer.abort();
    let shutdown = client.shutdown().await;
    result?;

    shutdown.map_err(|e| LeaderboardError::Core {
        message: format!("Failed to shut down client: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    info!("Leaderboard client stopped");
    Ok(())
}

/// Load `{config_dir}/config.json`, falling back to defaults on any problem.
fn load_config(config_dir: Option<PathBuf>) -> ClientConfig {
    let Some(config_dir) = config_dir else {
        warn!("No config directory on this platform, using defaults");
        return ClientConfig::default();
    };

    ClientConfig::load(&config_dir).unwrap_or_else(|e| {
        warn!("Ignoring config in {}: {e}", config_dir.display());
        ClientConfig::default()
    })
}

/// Print the UI state whenever it changes.
async fn render_changes(client: ClientHandle) {
    let mut state = client.subscribe();
    println!("{}", render(&state.borrow_and_update().ui_state()));

    while state.changed().await.is_ok() {
        let ui = state.borrow_and_update().ui_state();
        println!("{}", render(&ui));
    }
}

/// Apply stdin commands until `quit`, end of input, or Ctrl-C.
async fn read_commands(client: &ClientHandle) -> Result<(), LeaderboardError> {
    let mut lines = BufReader::new(stdin()).lines();
    let interrupt = ctrl_c();
    tokio::pin!(interrupt);

    loop {
        let line = tokio::select! {
            _ = &mut interrupt => {
                info!("Interrupted");
                return Ok(());
            }
            line = lines.next_line() => line.map_err(|e| LeaderboardError::Leaderboard {
                message: format!("Failed to read stdin: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?,
        };

        let Some(line) = line else {
            info!("End of input");
            return Ok(());
        };

        let applied = match parse_command(&line) {
            ConsoleCommand::SetField { key, value } => client.set_field(key, value).await,
            ConsoleCommand::ClearField { key } => client.clear_field(key).await,
            ConsoleCommand::Submit => client.submit().await.map(|outcome| {
                println!("{}", describe_outcome(outcome));
            }),
            ConsoleCommand::Help => {
                println!("{HELP_TEXT}");
                Ok(())
            }
            ConsoleCommand::Quit => return Ok(()),
            ConsoleCommand::Empty => Ok(()),
            ConsoleCommand::Unknown(input) => {
                println!("Unrecognized input: {input} (type `help`)");
                Ok(())
            }
        };

        if let Err(e) = applied {
            error!("Client stopped unexpectedly: {e}");
            return Err(LeaderboardError::Core {
                message: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
    }
}
