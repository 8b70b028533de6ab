use crate::helpers::{
    TEST_TIMEOUT, TestServer, fast_config, no_text_within, receive_text, send_server_message,
    send_text, unreachable_url,
};

use client_core::client::{ClientHandle, LeaderboardClient};
use client_core::sync::SubmitOutcome;

use models::{
    ClientMessage, ClientSnapshot, LeaderBoard, LeaderBoardEntry, RegistrationPhase, ServerMessage,
};

use std::time::Duration;

use serde_json::json;
use tokio::time::timeout;

async fn wait_until(client: &ClientHandle, condition: impl Fn(&ClientSnapshot) -> bool) {
    let mut state = client.subscribe();
    timeout(TEST_TIMEOUT, state.wait_for(|snapshot| condition(snapshot)))
        .await
        .expect("Timed out waiting for client state")
        .expect("Client actor stopped");
}

fn board(entries: serde_json::Value) -> LeaderBoard {
    serde_json::from_value(entries).expect("Invalid board")
}

/// **VALUE**: End-to-end check of the inbound path: server frames become UI state.
///
/// **WHY THIS MATTERS**: This is what a user sees: the connection indicator turns on,
/// the game starts, standings appear.
#[tokio::test]
async fn given_running_client_when_server_pushes_frames_then_ui_state_follows() {
    // GIVEN: A client connected to the test server
    let mut server = TestServer::start().await;
    let client = LeaderboardClient::start(&fast_config(server.url())).unwrap();
    let mut ws = server.next_connection().await;
    wait_until(&client, ClientSnapshot::connected).await;

    // WHEN: Registration closes and a board arrives
    send_server_message(&mut ws, &ServerMessage::RegistrationClosed).await;
    send_server_message(
        &mut ws,
        &ServerMessage::LeaderBoard {
            leader_board: board(json!([{"name": "A", "score": 10}])),
        },
    )
    .await;

    // THEN: Game in progress with that board
    wait_until(&client, |s| !s.leader_board.is_empty()).await;
    let ui = serde_json::to_value(client.snapshot().ui_state()).unwrap();
    assert_eq!(
        ui,
        json!({
            "connected": true,
            "gameInProgress": true,
            "leaderBoard": [{"name": "A", "score": 10}],
            "formDisabled": false
        })
    );

    client.shutdown().await.unwrap();
}

/// **VALUE**: Verifies a bad frame in the middle of a session is skipped.
///
/// **BUG THIS CATCHES**: Would catch a parse failure that kills the actor, after which
/// nothing else would ever update.
#[tokio::test]
async fn given_malformed_frame_when_received_then_later_frames_still_applied() {
    let mut server = TestServer::start().await;
    let client = LeaderboardClient::start(&fast_config(server.url())).unwrap();
    let mut ws = server.next_connection().await;
    wait_until(&client, ClientSnapshot::connected).await;

    send_text(&mut ws, "{definitely not json").await;
    send_text(&mut ws, r#"{"type":"somethingNew"}"#).await;
    send_server_message(&mut ws, &ServerMessage::RegistrationOpened).await;

    wait_until(&client, |s| s.registration == RegistrationPhase::Open).await;
    assert!(client.snapshot().connected());

    client.shutdown().await.unwrap();
}

/// **VALUE**: Verifies a connected submit reaches the server exactly once.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Field edits are applied after the submit (command ordering broken)
/// - The frame is sent twice on a double click
#[tokio::test]
async fn given_connected_client_when_submitting_then_server_receives_one_user_frame() {
    // GIVEN: A connected client with a filled-in form
    let mut server = TestServer::start().await;
    let client = LeaderboardClient::start(&fast_config(server.url())).unwrap();
    let mut ws = server.next_connection().await;
    wait_until(&client, ClientSnapshot::connected).await;
    client.set_field("name", "Ada").await.unwrap();
    client.set_field("team", "red").await.unwrap();

    // WHEN: Submitting twice
    let first = client.submit().await.unwrap();
    let second = client.submit().await.unwrap();

    // THEN: One frame with the user's fields, second submit refused
    assert_eq!(first, SubmitOutcome::Sent);
    assert_eq!(second, SubmitOutcome::AlreadySubmitted);

    let frame = ClientMessage::parse(&receive_text(&mut ws).await).unwrap();
    let ClientMessage::User { user } = frame;
    assert_eq!(
        serde_json::to_value(user).unwrap(),
        json!({"name": "Ada", "team": "red"})
    );
    assert!(no_text_within(&mut ws, Duration::from_millis(200)).await);
    assert!(client.snapshot().form_disabled);

    client.shutdown().await.unwrap();
}

/// **VALUE**: Verifies submit while disconnected: no frame, no error, form disabled.
#[tokio::test]
async fn given_disconnected_client_when_submitting_then_dropped_and_form_disabled() {
    let client = LeaderboardClient::start(&fast_config(unreachable_url().await)).unwrap();
    client.set_field("name", "Ada").await.unwrap();

    let outcome = client.submit().await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Dropped);
    wait_until(&client, |s| s.form_disabled).await;
    assert!(!client.snapshot().connected());

    client.shutdown().await.unwrap();
}

/// **VALUE**: Verifies phase and board survive a disconnect/reconnect cycle.
///
/// **WHY THIS MATTERS**: The server may not resend state right after a reconnect. The
/// user should keep seeing the last standings while the indicator shows the outage.
#[tokio::test]
async fn given_populated_state_when_connection_drops_and_returns_then_state_kept() {
    // GIVEN: Open registration and a board
    let mut server = TestServer::start().await;
    let client = LeaderboardClient::start(&fast_config(server.url())).unwrap();
    let mut ws = server.next_connection().await;
    wait_until(&client, ClientSnapshot::connected).await;
    send_server_message(&mut ws, &ServerMessage::RegistrationOpened).await;
    send_server_message(
        &mut ws,
        &ServerMessage::LeaderBoard {
            leader_board: LeaderBoard::new(vec![LeaderBoardEntry::new(
                json!({"name": "B", "score": 7}),
            )]),
        },
    )
    .await;
    wait_until(&client, |s| {
        s.registration == RegistrationPhase::Open && s.leader_board.len() == 1
    })
    .await;
    let before = client.snapshot();

    // WHEN: The server drops the connection
    ws.close(None).await.expect("Failed to close");
    drop(ws);

    // THEN: Disconnected, phase and board unchanged
    wait_until(&client, |s| !s.connected()).await;
    let during = client.snapshot();
    assert_eq!(during.registration, before.registration);
    assert_eq!(during.leader_board, before.leader_board);

    // WHEN: The client reconnects
    let _ws = server.next_connection().await;
    wait_until(&client, ClientSnapshot::connected).await;

    // THEN: Same state as before the gap
    assert_eq!(client.snapshot(), before);

    client.shutdown().await.unwrap();
}

/// **VALUE**: Verifies shutdown closes the connection and the handle reports it.
#[tokio::test]
async fn given_running_client_when_shut_down_then_disconnected_and_commands_fail() {
    let mut server = TestServer::start().await;
    let client = LeaderboardClient::start(&fast_config(server.url())).unwrap();
    let _ws = server.next_connection().await;
    wait_until(&client, ClientSnapshot::connected).await;

    client.shutdown().await.unwrap();

    assert!(!client.snapshot().connected());
    assert!(client.submit().await.is_err());
}

#[tokio::test]
async fn given_invalid_config_when_starting_then_returns_error() {
    let mut config = fast_config(String::from("ws://127.0.0.1:1/ws"));
    config.reconnect.growth_factor = 0.0;

    assert!(LeaderboardClient::start(&config).is_err());
}
