//! Domain models for the leaderboard client.
//!
//! This crate contains the data that crosses the wire and the state that the
//! rendering layer observes. Models carry no connection logic; they are
//! passed between the synchronizer and whatever displays them.

pub mod connection;
pub mod error;
pub mod leader_board;
pub mod protocol;
pub mod registration;
pub mod snapshot;

pub use common::ErrorLocation;
pub use connection::ConnectionState;
pub use error::model_error::ModelError;
pub use leader_board::{LeaderBoard, LeaderBoardEntry};
pub use protocol::{ClientMessage, ServerMessage};
pub use registration::builder::RegistrationRequestBuilder;
pub use registration::{RegistrationPhase, RegistrationRequest};
pub use snapshot::{ClientSnapshot, UiState};
