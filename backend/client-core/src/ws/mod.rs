//! Persistent WebSocket connection to the event server.
//!
//! [`ConnectionManager`] owns the socket. It reconnects on its own after any
//! close, using a capped exponential backoff described by
//! [`ReconnectPolicy`], and reports what happens as [`ConnectionEvent`]s:
//!
//! - `Opened` when a connection becomes ready
//! - `Message` once per inbound text frame, in transport order
//! - `Closed` when an open connection goes away for any reason
//!
//! All transport failures are handled the same way: mark disconnected, wait,
//! try again. Nothing here is ever fatal.

mod manager;
mod policy;

pub use manager::ConnectionManager;
pub use policy::{
    DEFAULT_BASE_DELAY, DEFAULT_CONNECT_TIMEOUT, DEFAULT_GROWTH_FACTOR, DEFAULT_MAX_DELAY,
    DEFAULT_RANDOMIZATION_FACTOR, ReconnectPolicy,
};

use crate::error::ws::WsError;

use common::ErrorLocation;

use std::panic::Location;

use url::Url;

/// Something that happened on the connection, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Opened,
    Message(String),
    Closed,
}

/// Parse and check a server endpoint.
///
/// Only plain `ws://` endpoints are accepted; the transport is built without
/// TLS support.
///
/// # Errors
///
/// - [`WsError::UrlParse`] if `raw` is not a URL
/// - [`WsError::Validation`] if the scheme is not `ws` or the host is missing
#[track_caller]
pub fn parse_endpoint(raw: &str) -> Result<Url, WsError> {
    let url = Url::parse(raw)?;

    if url.scheme() != "ws" {
        return Err(WsError::Validation {
            message: format!("Unsupported scheme '{}' in {raw}, expected ws", url.scheme()),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(WsError::Validation {
            message: format!("Missing host in {raw}"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(url)
}
