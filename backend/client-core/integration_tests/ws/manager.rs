use crate::helpers::{
    TEST_TIMEOUT, TestServer, fast_policy, next_event, receive_text, send_text, unreachable_url,
};

use client_core::error::ws::WsError;
use client_core::ws::{ConnectionEvent, ConnectionManager};

use models::ConnectionState;

use std::time::Duration;

use tokio::time::{sleep, timeout};

/// **VALUE**: Verifies connect → Opened, then each text frame → one Message event.
///
/// **WHY THIS MATTERS**: This is the entire inbound path. If frames are lost, merged or
/// reordered, the client shows the wrong phase or board.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Opened is not emitted, or emitted before the state flips to Connected
/// - Frames are delivered out of order
#[tokio::test]
async fn given_server_when_connected_then_opened_and_frames_delivered_in_order() {
    // GIVEN: A running server and a manager pointed at it
    let mut server = TestServer::start().await;
    let (manager, mut events) = ConnectionManager::connect(&server.url(), fast_policy())
        .expect("Valid URL should be accepted");
    let mut ws = server.next_connection().await;

    // THEN: Opened first, state Connected
    assert_eq!(next_event(&mut events).await, ConnectionEvent::Opened);
    assert_eq!(manager.connection_state(), ConnectionState::Connected);

    // WHEN: Server sends three frames
    send_text(&mut ws, "one").await;
    send_text(&mut ws, "two").await;
    send_text(&mut ws, "three").await;

    // THEN: They arrive in order, one event each
    for expected in ["one", "two", "three"] {
        assert_eq!(
            next_event(&mut events).await,
            ConnectionEvent::Message(expected.to_string())
        );
    }

    manager.shutdown().await;
}

/// **VALUE**: Verifies the manager reconnects by itself after the server closes.
///
/// **WHY THIS MATTERS**: Reconnection without user action is the point of the manager.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Closed is not emitted on server close
/// - No retry is scheduled after a close
/// - The state watch is left at Connected
#[tokio::test]
async fn given_open_connection_when_server_closes_then_closed_and_reconnects() {
    // GIVEN: An open connection
    let mut server = TestServer::start().await;
    let (manager, mut events) = ConnectionManager::connect(&server.url(), fast_policy()).unwrap();
    let mut ws = server.next_connection().await;
    assert_eq!(next_event(&mut events).await, ConnectionEvent::Opened);
    let mut state = manager.watch_connection();

    // WHEN: The server closes the connection
    ws.close(None).await.expect("Failed to close");
    drop(ws);

    // THEN: Closed, then a fresh connection and Opened again
    assert_eq!(next_event(&mut events).await, ConnectionEvent::Closed);
    let _second = server.next_connection().await;
    assert_eq!(next_event(&mut events).await, ConnectionEvent::Opened);

    timeout(TEST_TIMEOUT, state.wait_for(|s| s.is_connected()))
        .await
        .expect("State should return to Connected")
        .unwrap();

    manager.shutdown().await;
}

/// **VALUE**: Verifies outbound frames reach the server while connected.
#[tokio::test]
async fn given_open_connection_when_sending_then_server_receives_frame() {
    let mut server = TestServer::start().await;
    let (manager, mut events) = ConnectionManager::connect(&server.url(), fast_policy()).unwrap();
    let mut ws = server.next_connection().await;
    assert_eq!(next_event(&mut events).await, ConnectionEvent::Opened);

    let accepted = manager.send(String::from(r#"{"type":"user","user":{"name":"Ada"}}"#));

    assert!(accepted);
    assert_eq!(
        receive_text(&mut ws).await,
        r#"{"type":"user","user":{"name":"Ada"}}"#
    );

    manager.shutdown().await;
}

/// **VALUE**: Verifies sends while disconnected are dropped, not queued.
///
/// **WHY THIS MATTERS**: Delivery is at-most-once. A queued registration replayed after
/// reconnecting would be a surprise duplicate the user never confirmed.
///
/// **BUG THIS CATCHES**: Would catch frames being buffered while disconnected.
#[tokio::test]
async fn given_no_server_when_sending_then_dropped_without_error() {
    // GIVEN: A manager that cannot connect yet
    let url = unreachable_url().await;
    let (manager, _events) = ConnectionManager::connect(&url, fast_policy()).unwrap();
    sleep(Duration::from_millis(50)).await;

    // WHEN: Sending
    let accepted = manager.send(String::from("lost"));

    // THEN: Dropped without error
    assert!(!accepted);
    assert_eq!(manager.connection_state(), ConnectionState::Disconnected);

    manager.shutdown().await;
}

/// **VALUE**: Verifies teardown cancels a pending reconnection and ends the task.
///
/// **WHY THIS MATTERS**: A reconnection timer that outlives the UI keeps dialing the
/// server forever from a client nobody is looking at.
#[tokio::test]
async fn given_pending_reconnection_when_shut_down_then_task_ends_without_opening() {
    // GIVEN: A manager retrying against a dead port
    let url = unreachable_url().await;
    let (manager, mut events) = ConnectionManager::connect(&url, fast_policy()).unwrap();
    sleep(Duration::from_millis(100)).await;

    // WHEN: Shutting down
    timeout(TEST_TIMEOUT, manager.shutdown())
        .await
        .expect("Shutdown should not hang");

    // THEN: No events were emitted and the stream is closed
    assert_eq!(
        timeout(TEST_TIMEOUT, events.recv()).await.unwrap(),
        None,
        "Failed attempts must not emit Opened or Closed"
    );
}

/// **VALUE**: Verifies explicit teardown of an open connection still reports Closed.
#[tokio::test]
async fn given_open_connection_when_torn_down_then_closed_emitted_and_no_reconnect() {
    let mut server = TestServer::start().await;
    let (manager, mut events) = ConnectionManager::connect(&server.url(), fast_policy()).unwrap();
    let _ws = server.next_connection().await;
    assert_eq!(next_event(&mut events).await, ConnectionEvent::Opened);

    manager.teardown();

    assert_eq!(next_event(&mut events).await, ConnectionEvent::Closed);
    assert_eq!(timeout(TEST_TIMEOUT, events.recv()).await.unwrap(), None);

    drop(manager);
}

#[tokio::test]
async fn given_http_url_when_connecting_then_returns_validation_error() {
    let result = ConnectionManager::connect("http://127.0.0.1:8080/ws", fast_policy());

    assert!(matches!(result, Err(WsError::Validation { .. })));
}
