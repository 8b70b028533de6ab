use crate::LEADERBOARD_SERVER_URL;
use crate::error::ws::WsError;
use crate::ws::parse_endpoint;

#[test]
fn given_default_server_url_when_parsed_then_accepted() {
    let url = parse_endpoint(LEADERBOARD_SERVER_URL).unwrap();

    assert_eq!(LEADERBOARD_SERVER_URL, "ws://localhost:8080/ws");
    assert_eq!(url.host_str(), Some("localhost"));
    assert_eq!(url.port(), Some(8080));
    assert_eq!(url.path(), "/ws");
}

/// **VALUE**: Verifies non-WebSocket endpoints are rejected up front.
///
/// **WHY THIS MATTERS**: A typo like `http://` would otherwise fail on every attempt and
/// retry forever, showing only "disconnected" with no hint why.
#[test]
fn given_non_ws_scheme_when_parsed_then_returns_validation_error() {
    for raw in ["http://localhost:8080/ws", "wss://example.com/ws", "file:///tmp/ws"] {
        match parse_endpoint(raw) {
            Err(WsError::Validation { message, .. }) => {
                assert!(message.contains("expected ws"), "{raw}: {message}");
            }
            other => panic!("{raw}: expected validation error, got {other:?}"),
        }
    }
}

#[test]
fn given_garbage_when_parsed_then_returns_url_parse_error() {
    assert!(matches!(
        parse_endpoint("not a url"),
        Err(WsError::UrlParse { .. })
    ));
}

/// **VALUE**: Verifies `wss://` is refused at configuration time.
///
/// **WHY THIS MATTERS**: The transport is built without TLS. Accepting `wss` would pass
/// validation and then fail every handshake, retrying forever.
#[test]
fn given_wss_url_when_parsed_then_rejected_as_unsupported_scheme() {
    let result = parse_endpoint("wss://example.com/ws");

    match result {
        Err(WsError::Validation { message, .. }) => {
            assert!(message.contains("'wss'"), "{message}");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}
