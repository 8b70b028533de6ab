use crate::{ConnectionState, LeaderBoard, RegistrationPhase};

use serde::Serialize;

/// Everything the rendering layer can observe about the client.
///
/// Owned and mutated by the synchronizer only; observers receive clones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientSnapshot {
    pub connection: ConnectionState,
    pub registration: RegistrationPhase,
    pub leader_board: LeaderBoard,
    pub form_disabled: bool,
}

impl ClientSnapshot {
    pub fn connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn game_in_progress(&self) -> bool {
        self.registration.game_in_progress()
    }

    /// Flatten into the booleans and list a view binds to.
    pub fn ui_state(&self) -> UiState {
        UiState {
            connected: self.connected(),
            game_in_progress: self.game_in_progress(),
            leader_board: self.leader_board.clone(),
            form_disabled: self.form_disabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub connected: bool,
    pub game_in_progress: bool,
    pub leader_board: LeaderBoard,
    pub form_disabled: bool,
}
