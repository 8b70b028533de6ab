use crate::client::actor::ClientCommand;
use crate::error::client::ClientError;
use crate::sync::SubmitOutcome;

use models::ClientSnapshot;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};

/// Handle to a running [`LeaderboardClient`](super::LeaderboardClient).
///
/// All clones talk to the same actor. The actor stops when
/// [`shutdown`](Self::shutdown) is called or the last handle is dropped.
#[derive(Clone)]
pub struct ClientHandle {
    command_tx: mpsc::Sender<ClientCommand>,
    state_rx: watch::Receiver<ClientSnapshot>,
}

impl ClientHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<ClientCommand>,
        state_rx: watch::Receiver<ClientSnapshot>,
    ) -> Self {
        Self {
            command_tx,
            state_rx,
        }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ClientSnapshot> {
        self.state_rx.clone()
    }

    pub fn snapshot(&self) -> ClientSnapshot {
        self.state_rx.borrow().clone()
    }

    pub async fn set_field(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), ClientError> {
        self.command(ClientCommand::SetField {
            key: key.into(),
            value: value.into(),
        })
        .await
    }

    pub async fn clear_field(&self, key: impl Into<String>) -> Result<(), ClientError> {
        self.command(ClientCommand::ClearField { key: key.into() })
            .await
    }

    /// Submit the current form contents.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ActorStopped`] if the client has shut down.
    pub async fn submit(&self) -> Result<SubmitOutcome, ClientError> {
        let (reply, outcome) = oneshot::channel();
        self.command(ClientCommand::Submit { reply }).await?;

        outcome
            .await
            .map_err(|e| ClientError::actor_stopped(format!("No submit reply: {e}")))
    }

    /// Stop the client and wait until its connection is closed.
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        let (reply, done) = oneshot::channel();
        self.command(ClientCommand::Shutdown { reply }).await?;

        done.await
            .map_err(|e| ClientError::actor_stopped(format!("No shutdown reply: {e}")))
    }

    async fn command(&self, command: ClientCommand) -> Result<(), ClientError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| ClientError::actor_stopped(format!("Client actor gone: {e}")))
    }
}
