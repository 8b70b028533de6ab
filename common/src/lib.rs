//! Shared building blocks for the leaderboard client.
//!
//! Everything here is free of domain logic so that `models`, `client-core`
//! and the console app can all depend on it without pulling each other in.
//!
//! ## Architecture
//!
//! - **common** (this crate): Error location tracking
//! - **models**: Wire messages and observable state
//! - **client-core**: Connection handling and state synchronization
//! - **leaderboard**: Console host wiring everything together

pub mod error;

pub use error::error_location::ErrorLocation;
