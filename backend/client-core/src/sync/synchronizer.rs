use crate::sync::{FormLockPolicy, FrameSink, SubmitOutcome};
use crate::ws::ConnectionEvent;

use models::{
    ClientMessage, ClientSnapshot, ConnectionState, LeaderBoard, RegistrationPhase,
    RegistrationRequestBuilder, ServerMessage,
};

use log::{debug, error, info, warn};
use serde_json::Value;
use tokio::sync::watch;

/// Applies connection events to the client state and sends registrations.
///
/// Every method runs to completion synchronously; callers drive it from a
/// single task. After each event that changes the snapshot, subscribers are
/// notified.
pub struct ClientSynchronizer<S> {
    sink: S,
    form_policy: FormLockPolicy,
    input: RegistrationRequestBuilder,
    state_tx: watch::Sender<ClientSnapshot>,
}

impl<S: FrameSink> ClientSynchronizer<S> {
    pub fn new(sink: S, form_policy: FormLockPolicy) -> Self {
        let (state_tx, _) = watch::channel(ClientSnapshot::default());

        Self {
            sink,
            form_policy,
            input: RegistrationRequestBuilder::default(),
            state_tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ClientSnapshot> {
        self.state_tx.subscribe()
    }

    pub fn snapshot(&self) -> ClientSnapshot {
        self.state_tx.borrow().clone()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Current contents of the registration form.
    pub fn input(&self) -> &RegistrationRequestBuilder {
        &self.input
    }

    /// Update one form field. Ignored once the form is disabled.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        if self.state_tx.borrow().form_disabled {
            debug!("Form disabled, ignoring input");
            return false;
        }

        self.input.set_field(key, value);
        true
    }

    pub fn clear_field(&mut self, key: &str) -> bool {
        if self.state_tx.borrow().form_disabled {
            debug!("Form disabled, ignoring input");
            return false;
        }

        self.input.remove_field(key).is_some()
    }

    pub fn handle_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Opened => self.on_open(),
            ConnectionEvent::Closed => self.on_close(),
            ConnectionEvent::Message(raw) => self.on_message(&raw),
        }
    }

    pub fn on_open(&mut self) {
        self.set_connection(ConnectionState::Connected);
    }

    /// Only the connected flag changes; phase and board stay as last seen.
    pub fn on_close(&mut self) {
        self.set_connection(ConnectionState::Disconnected);
    }

    /// Apply one inbound frame.
    ///
    /// Unknown frame types are ignored. Frames that do not parse are logged
    /// and skipped so that one bad frame cannot end the session.
    pub fn on_message(&mut self, raw: &str) {
        let message = match ServerMessage::parse(raw) {
            Ok(message) => message,
            Err(e) => {
                warn!("Skipping malformed frame ({e}): {raw}");
                return;
            }
        };

        match message {
            ServerMessage::RegistrationOpened => self.set_registration(RegistrationPhase::Open),
            ServerMessage::RegistrationClosed => self.set_registration(RegistrationPhase::Closed),
            ServerMessage::LeaderBoard { leader_board } => self.replace_leader_board(leader_board),
            ServerMessage::Unknown => debug!("Ignoring frame of unknown type: {raw}"),
        }
    }

    /// Send the form contents as a registration, once.
    ///
    /// Does not wait for the server and never retries. Under
    /// [`FormLockPolicy::LockAlways`] the form is disabled and the input
    /// cleared whether or not the frame could be delivered.
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.state_tx.borrow().form_disabled {
            debug!("Registration already submitted");
            return SubmitOutcome::AlreadySubmitted;
        }

        let request = match self.input.clone().build() {
            Ok(request) => request,
            Err(e) => {
                warn!("Registration not submitted: {e}");
                return SubmitOutcome::Rejected;
            }
        };

        let frame = match (ClientMessage::User { user: request }).to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to serialize registration: {e}");
                return SubmitOutcome::Rejected;
            }
        };

        let delivered = self.sink.send_frame(frame);

        if !delivered && self.form_policy == FormLockPolicy::UnlockOnDroppedSend {
            warn!("Registration dropped while disconnected, form left enabled");
            return SubmitOutcome::Dropped;
        }

        self.input.clear();
        self.state_tx.send_if_modified(|state| {
            let changed = !state.form_disabled;
            state.form_disabled = true;
            changed
        });

        if delivered {
            info!("Registration sent");
            SubmitOutcome::Sent
        } else {
            warn!("Registration dropped while disconnected");
            SubmitOutcome::Dropped
        }
    }

    fn set_connection(&mut self, connection: ConnectionState) {
        let changed = self.state_tx.send_if_modified(|state| {
            let changed = state.connection != connection;
            state.connection = connection;
            changed
        });

        if changed {
            info!("Connection state: {connection:?}");
        }
    }

    fn set_registration(&mut self, registration: RegistrationPhase) {
        let changed = self.state_tx.send_if_modified(|state| {
            let changed = state.registration != registration;
            state.registration = registration;
            changed
        });

        if changed {
            info!("Registration phase: {registration:?}");
        }
    }

    fn replace_leader_board(&mut self, leader_board: LeaderBoard) {
        let entries = leader_board.len();
        let changed = self.state_tx.send_if_modified(|state| {
            if state.leader_board == leader_board {
                return false;
            }
            state.leader_board = leader_board;
            true
        });

        if changed {
            debug!("Leader board replaced ({entries} entries)");
        }
    }
}
