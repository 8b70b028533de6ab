pub mod client;
pub mod config;
pub mod error;
pub mod sync;
pub mod ws;


pub const LEADERBOARD_SERVER_HOSTNAME: &str = "localhost";
pub const LEADERBOARD_SERVER_PORT: u16 = 8080;
pub const LEADERBOARD_SERVER_PATH: &str = "/ws";
pub const LEADERBOARD_SERVER_URL: &str = const_format::concatcp!(
    "ws://",
    LEADERBOARD_SERVER_HOSTNAME,
    ":",
    LEADERBOARD_SERVER_PORT,
    LEADERBOARD_SERVER_PATH
);
