use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ClientError {
    #[error("Actor Stopped Error: {message} {location}")]
    ActorStopped {
        message: String,
        location: ErrorLocation,
    },
}

impl ClientError {
    #[track_caller]
    pub(crate) fn actor_stopped(message: impl Into<String>) -> Self {
        ClientError::ActorStopped {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
