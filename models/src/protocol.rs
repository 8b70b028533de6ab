//! JSON frames exchanged with the event server.
//!
//! Every frame is an object tagged by its `type` field:
//!
//! - Server → Client: `registrationOpened`, `registrationClosed`, `leaderBoard`
//! - Client → Server: `user`

use crate::{LeaderBoard, RegistrationRequest};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    RegistrationOpened,

    RegistrationClosed,

    LeaderBoard {
        #[serde(rename = "leaderBoard")]
        leader_board: LeaderBoard,
    },

    /// Any `type` this client does not know yet. Never encoded.
    #[serde(other, skip_serializing)]
    Unknown,
}

impl ServerMessage {
    /// Parse one inbound text frame.
    ///
    /// Unknown `type` values parse as [`ServerMessage::Unknown`]; anything
    /// that is not a tagged object, or a known tag with a missing field, is
    /// an error.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Encode as a text frame.
    ///
    /// [`ServerMessage::Unknown`] has no wire form and fails to encode.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    User { user: RegistrationRequest },
}

impl ClientMessage {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
