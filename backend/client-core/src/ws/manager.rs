//! Connection task and its handle.
//!
//! The task owns the socket for its whole life. The handle only talks to it
//! through channels: an outbound frame queue, a shutdown flag, and a watch on
//! the connection state.

use crate::error::ws::WsError;
use crate::sync::FrameSink;
use crate::ws::{ConnectionEvent, ReconnectPolicy, parse_endpoint};

use models::ConnectionState;

use backoff::backoff::Backoff;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, trace, warn};
use tokio::net::TcpStream;
use tokio::spawn as TokioSpawn;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep as TokioSleep, timeout as TokioTimeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

type ServerStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Handle to a self-healing connection.
///
/// Created with [`connect`](Self::connect), which returns immediately; the
/// connection is established in a background task. Dropping the handle tears
/// the connection down and cancels any pending reconnection.
pub struct ConnectionManager {
    url: Url,
    state_rx: watch::Receiver<ConnectionState>,
    outbound_tx: mpsc::UnboundedSender<String>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ConnectionManager {
    /// Start connecting to `url`.
    ///
    /// Must be called from within a tokio runtime. Returns the handle together
    /// with the stream of [`ConnectionEvent`]s for this connection.
    ///
    /// # Errors
    ///
    /// Returns [`WsError`] if `url` is not a usable `ws://` endpoint. Network
    /// failures are never returned; they are retried in the background.
    #[track_caller]
    pub fn connect(
        url: &str,
        policy: ReconnectPolicy,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ConnectionEvent>), WsError> {
        let url = parse_endpoint(url)?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let connection = ConnectionTask {
            url: url.clone(),
            policy,
            event_tx,
            state_tx,
            outbound_rx,
            shutdown_rx,
        };

        info!("Connecting to {url}");
        let task = TokioSpawn(connection.run());

        Ok((
            Self {
                url,
                state_rx,
                outbound_tx,
                shutdown_tx,
                task: Some(task),
            },
            event_rx,
        ))
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Observe connection state changes.
    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Send one text frame if connected.
    ///
    /// Returns `false` when the frame was dropped because there is no open
    /// connection. Dropped frames are not queued for the next connection.
    pub fn send(&self, payload: String) -> bool {
        if !self.connection_state().is_connected() {
            debug!("Not connected to {}, dropping outbound frame", self.url);
            return false;
        }

        self.outbound_tx.send(payload).is_ok()
    }

    /// Stop reconnecting and close the connection if one is open.
    ///
    /// An open connection still reports [`ConnectionEvent::Closed`].
    pub fn teardown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Tear down and wait for the background task to finish.
    pub async fn shutdown(mut self) {
        self.teardown();

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Connection task for {} ended abnormally: {e}", self.url);
            }
        }
    }
}

impl FrameSink for ConnectionManager {
    fn send_frame(&self, payload: String) -> bool {
        self.send(payload)
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

enum Attempt {
    Opened(Box<ServerStream>),
    Failed,
    Shutdown,
}

#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    Closed,
    Shutdown,
}

struct ConnectionTask {
    url: Url,
    policy: ReconnectPolicy,
    event_tx: mpsc::UnboundedSender<ConnectionEvent>,
    state_tx: watch::Sender<ConnectionState>,
    outbound_rx: mpsc::UnboundedReceiver<String>,
    shutdown_rx: watch::Receiver<bool>,
}

impl ConnectionTask {
    async fn run(mut self) {
        let mut backoff = self.policy.backoff();

        loop {
            match self.open().await {
                Attempt::Shutdown => break,
                Attempt::Failed => {}
                Attempt::Opened(stream) => {
                    backoff.reset();
                    self.mark_open();
                    let end = self.pump(*stream).await;
                    self.mark_closed();

                    if end == SessionEnd::Shutdown {
                        break;
                    }
                }
            }

            let Some(delay) = backoff.next_backoff() else {
                warn!("Reconnection backoff exhausted for {}", self.url);
                break;
            };

            debug!("Reconnecting to {} in {delay:?}", self.url);

            tokio::select! {
                _ = shutdown_requested(&mut self.shutdown_rx) => break,
                _ = TokioSleep(delay) => {}
            }
        }

        info!("Connection to {} torn down", self.url);
    }

    async fn open(&mut self) -> Attempt {
        let handshake = TokioTimeout(self.policy.connect_timeout, connect_async(self.url.as_str()));

        tokio::select! {
            _ = shutdown_requested(&mut self.shutdown_rx) => Attempt::Shutdown,
            result = handshake => match result {
                Ok(Ok((stream, _response))) => {
                    info!("Connected to {}", self.url);
                    Attempt::Opened(Box::new(stream))
                }
                Ok(Err(e)) => {
                    warn!("Connection to {} failed: {e}", self.url);
                    Attempt::Failed
                }
                Err(_) => {
                    warn!(
                        "Connection to {} timed out after {:?}",
                        self.url, self.policy.connect_timeout
                    );
                    Attempt::Failed
                }
            },
        }
    }

    /// Shuttle frames until the connection ends.
    async fn pump(&mut self, stream: ServerStream) -> SessionEnd {
        let (mut write, mut read) = stream.split();

        loop {
            tokio::select! {
                _ = shutdown_requested(&mut self.shutdown_rx) => {
                    if let Err(e) = write.send(Message::Close(None)).await {
                        debug!("Failed to send close frame to {}: {e}", self.url);
                    }
                    return SessionEnd::Shutdown;
                }
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        trace!("Received frame: {}", text.as_str());
                        self.emit(ConnectionEvent::Message(text.as_str().to_owned()));
                    }
                    Some(Ok(Message::Binary(data))) => {
                        warn!("Ignoring {} byte binary frame from {}", data.len(), self.url);
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!("Server {} closed the connection: {frame:?}", self.url);
                        return SessionEnd::Closed;
                    }
                    // Ping/pong are answered by tungstenite
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Connection to {} lost: {e}", self.url);
                        return SessionEnd::Closed;
                    }
                    None => {
                        info!("Connection to {} ended", self.url);
                        return SessionEnd::Closed;
                    }
                },
                payload = self.outbound_rx.recv() => match payload {
                    Some(payload) => {
                        trace!("Sending frame: {payload}");
                        if let Err(e) = write.send(Message::Text(payload.into())).await {
                            warn!("Failed to send frame to {}: {e}", self.url);
                            return SessionEnd::Closed;
                        }
                    }
                    // The handle is gone
                    None => return SessionEnd::Shutdown,
                },
            }
        }
    }

    fn mark_open(&mut self) {
        self.discard_stale_frames();
        self.state_tx.send_replace(ConnectionState::Connected);
        self.emit(ConnectionEvent::Opened);
    }

    fn mark_closed(&mut self) {
        self.state_tx.send_replace(ConnectionState::Disconnected);
        self.discard_stale_frames();
        self.emit(ConnectionEvent::Closed);
    }

    /// Frames queued for a connection that has since closed are never delivered.
    fn discard_stale_frames(&mut self) {
        let mut discarded = 0usize;
        while self.outbound_rx.try_recv().is_ok() {
            discarded += 1;
        }

        if discarded > 0 {
            debug!("Discarded {discarded} undelivered frame(s) for {}", self.url);
        }
    }

    fn emit(&self, event: ConnectionEvent) {
        if self.event_tx.send(event).is_err() {
            trace!("No listener for connection events from {}", self.url);
        }
    }
}

/// Resolves once teardown is requested or the handle is dropped.
async fn shutdown_requested(shutdown_rx: &mut watch::Receiver<bool>) {
    let _ = shutdown_rx.wait_for(|stop| *stop).await;
}
