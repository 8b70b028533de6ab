pub mod builder;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whether the event is accepting new registrations.
///
/// Starts `Closed` until the server says otherwise. Only inbound
/// `registrationOpened` / `registrationClosed` frames move it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationPhase {
    Open,
    #[default]
    Closed,
}

impl RegistrationPhase {
    /// A game is running exactly when registration is closed.
    pub fn game_in_progress(self) -> bool {
        self == RegistrationPhase::Closed
    }
}

/// Identity payload submitted once by the user.
///
/// Arbitrary user-supplied fields; the server decides what they mean. Build it
/// with [`RegistrationRequestBuilder`](builder::RegistrationRequestBuilder),
/// which rejects an empty submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationRequest(Map<String, Value>);

impl RegistrationRequest {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}
