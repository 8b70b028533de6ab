//! Test helpers for integration tests.
//!
//! - A throwaway WebSocket server that hands each accepted connection to the test
//! - Frame send/receive helpers with timeouts
//! - A fast reconnect policy so tests do not wait seconds between attempts

use client_core::config::{ClientConfig, ReconnectConfig, ServerConfig};
use client_core::ws::{ConnectionEvent, ReconnectPolicy};

use models::ServerMessage;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

/// Upper bound for anything a test waits on.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

pub type ServerSocket = WebSocketStream<TcpStream>;

/// Local WebSocket server. Accepted connections queue up for [`next_connection`].
///
/// [`next_connection`]: TestServer::next_connection
pub struct TestServer {
    port: u16,
    connections: mpsc::UnboundedReceiver<ServerSocket>,
    accept_task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let port = listener.local_addr().expect("No local addr").port();
        let (tx, connections) = mpsc::unbounded_channel();

        let accept_task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                match accept_async(stream).await {
                    Ok(ws) => {
                        if tx.send(ws).is_err() {
                            break;
                        }
                    }
                    Err(e) => eprintln!("Test server handshake failed: {e}"),
                }
            }
        });

        Self {
            port,
            connections,
            accept_task,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    pub async fn next_connection(&mut self) -> ServerSocket {
        timeout(TEST_TIMEOUT, self.connections.recv())
            .await
            .expect("Timed out waiting for client to connect")
            .expect("Test server stopped")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

/// URL of a port nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let port = listener.local_addr().expect("No local addr").port();
    drop(listener);
    format!("ws://127.0.0.1:{port}/ws")
}

pub fn fast_policy() -> ReconnectPolicy {
    ReconnectPolicy {
        base_delay: Duration::from_millis(20),
        max_delay: Duration::from_millis(100),
        growth_factor: 2.0,
        randomization_factor: 0.0,
        connect_timeout: Duration::from_secs(1),
    }
}

pub fn fast_config(url: String) -> ClientConfig {
    ClientConfig {
        server: ServerConfig { url },
        reconnect: ReconnectConfig {
            base_delay_ms: 20,
            max_delay_ms: 100,
            growth_factor: 2.0,
            randomization_factor: 0.0,
            connect_timeout_ms: 1000,
        },
        ..Default::default()
    }
}

pub async fn send_server_message(ws: &mut ServerSocket, message: &ServerMessage) {
    let frame = message.to_frame().expect("Failed to encode server message");
    send_text(ws, &frame).await;
}

pub async fn send_text(ws: &mut ServerSocket, frame: &str) {
    ws.send(Message::Text(frame.to_owned().into()))
        .await
        .expect("Failed to send frame");
}

/// Next text frame from the client, skipping control frames.
pub async fn receive_text(ws: &mut ServerSocket) -> String {
    loop {
        let msg = timeout(TEST_TIMEOUT, ws.next())
            .await
            .expect("Timed out waiting for frame")
            .expect("Connection closed")
            .expect("Error receiving frame");

        if let Message::Text(text) = msg {
            return text.as_str().to_owned();
        }
    }
}

/// True if the client sends no text frame within `wait`.
pub async fn no_text_within(ws: &mut ServerSocket, wait: Duration) -> bool {
    loop {
        match timeout(wait, ws.next()).await {
            Err(_) => return true,
            Ok(Some(Ok(Message::Text(_)))) => return false,
            Ok(Some(Ok(_))) => continue,
            Ok(Some(Err(_))) | Ok(None) => return true,
        }
    }
}

pub async fn next_event(events: &mut mpsc::UnboundedReceiver<ConnectionEvent>) -> ConnectionEvent {
    timeout(TEST_TIMEOUT, events.recv())
        .await
        .expect("Timed out waiting for connection event")
        .expect("Connection event stream ended")
}
