//! The running client: one task that owns the connection and the state.
//!
//! [`LeaderboardClient::start`] wires a [`ConnectionManager`] into a
//! [`ClientSynchronizer`] and spawns the actor that drives them. Connection
//! events and user commands are processed one at a time by that actor, so
//! no state is ever touched from two places at once.
//!
//! Callers hold a [`ClientHandle`]: cheap to clone, used to edit the form,
//! submit, observe state, and shut down.

mod actor;
mod handle;

pub use handle::ClientHandle;

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::sync::ClientSynchronizer;
use crate::ws::ConnectionManager;

use log::info;
use tokio::spawn as TokioSpawn;
use tokio::sync::mpsc;

const COMMAND_CHANNEL_CAPACITY: usize = 64;

pub struct LeaderboardClient;

impl LeaderboardClient {
    /// Validate `config`, start connecting, and spawn the client actor.
    ///
    /// Must be called from within a tokio runtime. Returns as soon as the
    /// actor is running; the connection comes up in the background.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Config`] if `config` fails validation
    /// - [`CoreError::Ws`] if the server URL is unusable
    pub fn start(config: &ClientConfig) -> Result<ClientHandle, CoreError> {
        config.validate()?;

        let (manager, events) =
            ConnectionManager::connect(&config.server.url, config.reconnect.policy())?;
        let synchronizer = ClientSynchronizer::new(manager, config.registration.form_policy);
        let state_rx = synchronizer.subscribe();

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        TokioSpawn(actor::run(synchronizer, events, command_rx));

        info!("Leaderboard client started for {}", config.server.url);
        Ok(ClientHandle::new(command_tx, state_rx))
    }
}
