use common::ErrorLocation;

use serde::Serialize;
use thiserror::Error;

/// Errors raised by the console host.
///
/// Core failures are flattened into a message so the error stays
/// serializable for the log file and for any future front end.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum LeaderboardError {
    /// Error from this app (logger, directories, stdin)
    #[error("Leaderboard Error: {message} {location}")]
    Leaderboard {
        message: String,
        location: ErrorLocation,
    },

    /// Error from client-core (config, connection, client actor)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },
}
