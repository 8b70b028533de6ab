// Integration tests for client-core
// Each test runs a real WebSocket server on 127.0.0.1 with an OS-assigned port.

mod client;
mod helpers;
mod ws;
