//! Client-side view of the event, kept in step with the server.
//!
//! [`ClientSynchronizer`] owns the only mutable copy of the
//! [`ClientSnapshot`](models::ClientSnapshot). It turns connection events into
//! state transitions, turns a submit into one outbound `user` frame, and
//! publishes the snapshot through a `tokio::sync::watch` channel so the
//! rendering layer can subscribe instead of reading shared globals.
//!
//! # Ordering
//!
//! Registration phase and leader board are independent. Frames are applied in
//! the order the connection delivers them; nothing is assumed about which
//! arrives first, or about frames from before and after a reconnect.

mod synchronizer;

pub use synchronizer::ClientSynchronizer;

use serde::{Deserialize, Serialize};

/// Where outbound frames go.
///
/// Implemented by [`ConnectionManager`](crate::ws::ConnectionManager). The
/// synchronizer never sees the socket itself.
pub trait FrameSink {
    /// Hand off one text frame. Returns `false` if it was dropped.
    fn send_frame(&self, payload: String) -> bool;
}

/// What happens to the registration form when a submit is dropped because the
/// client is disconnected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormLockPolicy {
    /// Disable the form on every submit, delivered or not.
    #[default]
    LockAlways,

    /// Leave the form enabled, with its input, if the frame was dropped.
    UnlockOnDroppedSend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The registration frame was handed to an open connection.
    Sent,

    /// Not connected; the frame was discarded.
    Dropped,

    /// Nothing was entered; no frame was built.
    Rejected,

    /// The form is already disabled by an earlier submit.
    AlreadySubmitted,
}
