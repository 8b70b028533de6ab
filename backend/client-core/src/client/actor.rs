use crate::sync::{ClientSynchronizer, SubmitOutcome};
use crate::ws::{ConnectionEvent, ConnectionManager};

use log::{debug, info};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

/// Requests from a [`ClientHandle`](super::ClientHandle) to the actor.
#[derive(Debug)]
pub(crate) enum ClientCommand {
    SetField { key: String, value: Value },
    ClearField { key: String },
    Submit { reply: oneshot::Sender<SubmitOutcome> },
    Shutdown { reply: oneshot::Sender<()> },
}

/// The client actor.
///
/// Owns the synchronizer (and through it the connection) and processes
/// connection events and commands in arrival order until shut down or until
/// every handle is dropped.
pub(crate) async fn run(
    mut synchronizer: ClientSynchronizer<ConnectionManager>,
    mut events: mpsc::UnboundedReceiver<ConnectionEvent>,
    mut commands: mpsc::Receiver<ClientCommand>,
) {
    info!("Client actor started");

    let mut shutdown_reply = None;

    loop {
        tokio::select! {
            Some(event) = events.recv() => synchronizer.handle_event(event),
            command = commands.recv() => match command {
                Some(ClientCommand::SetField { key, value }) => {
                    synchronizer.set_field(key, value);
                }
                Some(ClientCommand::ClearField { key }) => {
                    synchronizer.clear_field(&key);
                }
                Some(ClientCommand::Submit { reply }) => {
                    let outcome = synchronizer.submit();
                    if reply.send(outcome).is_err() {
                        debug!("Submit caller went away before the reply");
                    }
                }
                Some(ClientCommand::Shutdown { reply }) => {
                    shutdown_reply = Some(reply);
                    break;
                }
                None => {
                    debug!("All client handles dropped");
                    break;
                }
            },
        }
    }

    // Let the final Closed event land before going away.
    synchronizer.sink().teardown();
    while let Some(event) = events.recv().await {
        synchronizer.handle_event(event);
    }

    info!("Client actor stopped");

    if let Some(reply) = shutdown_reply {
        let _ = reply.send(());
    }
}
