// Unit tests for the client state synchronizer
// Connection behaviour is faked with a recording sink; real sockets are covered
// in integration_tests/client.

use crate::sync::{ClientSynchronizer, FormLockPolicy, FrameSink, SubmitOutcome};
use crate::ws::ConnectionEvent;

use models::{ConnectionState, RegistrationPhase};

use std::cell::{Cell, RefCell};

use serde_json::{Value, json};

/// Stands in for the connection: records frames, drops them when "disconnected".
#[derive(Default)]
struct RecordingSink {
    connected: Cell<bool>,
    frames: RefCell<Vec<String>>,
}

impl RecordingSink {
    fn connected() -> Self {
        let sink = Self::default();
        sink.connected.set(true);
        sink
    }

    fn frames(&self) -> Vec<Value> {
        self.frames
            .borrow()
            .iter()
            .map(|frame| serde_json::from_str(frame).unwrap())
            .collect()
    }
}

impl FrameSink for RecordingSink {
    fn send_frame(&self, payload: String) -> bool {
        if !self.connected.get() {
            return false;
        }
        self.frames.borrow_mut().push(payload);
        true
    }
}

fn synchronizer(sink: RecordingSink) -> ClientSynchronizer<RecordingSink> {
    ClientSynchronizer::new(sink, FormLockPolicy::LockAlways)
}

fn leader_board_frame(entries: Value) -> String {
    json!({"type": "leaderBoard", "leaderBoard": entries}).to_string()
}

const OPENED: &str = r#"{"type":"registrationOpened"}"#;
const CLOSED: &str = r#"{"type":"registrationClosed"}"#;

/// **VALUE**: Verifies the state before any event.
#[test]
fn given_new_synchronizer_when_inspected_then_starts_disconnected_closed_and_empty() {
    let sync = synchronizer(RecordingSink::default());

    let snapshot = sync.snapshot();

    assert_eq!(snapshot.connection, ConnectionState::Disconnected);
    assert_eq!(snapshot.registration, RegistrationPhase::Closed);
    assert!(snapshot.leader_board.is_empty());
    assert!(!snapshot.form_disabled);
}

/// **VALUE**: Verifies the reference scenario: closed, then a board.
///
/// **WHY THIS MATTERS**: This is the normal start of a game: registration closes and the
/// first standings arrive. The view must show the game in progress with that board.
#[test]
fn given_registration_closed_then_leader_board_when_applied_then_game_in_progress_with_board() {
    // GIVEN: A synchronizer
    let mut sync = synchronizer(RecordingSink::default());

    // WHEN: registrationClosed then leaderBoard arrive
    sync.on_message(CLOSED);
    sync.on_message(&leader_board_frame(json!([{"name": "A", "score": 10}])));

    // THEN: Observable state matches
    let ui = serde_json::to_value(sync.snapshot().ui_state()).unwrap();
    assert_eq!(ui["gameInProgress"], json!(true));
    assert_eq!(ui["leaderBoard"], json!([{"name": "A", "score": 10}]));
}

/// **VALUE**: Verifies that the phase always equals the last open/closed frame, whatever
/// leader board frames are interleaved.
///
/// **BUG THIS CATCHES**: Would catch a leader board update that resets or toggles the
/// phase, or a phase update that clears the board.
#[test]
fn given_interleaved_phase_and_board_frames_when_applied_then_phase_follows_last_phase_frame() {
    let sequences: Vec<Vec<&str>> = vec![
        vec![OPENED],
        vec![CLOSED],
        vec![OPENED, "board", CLOSED],
        vec![CLOSED, "board", OPENED, "board"],
        vec!["board", OPENED, OPENED, "board"],
        vec![OPENED, CLOSED, "board", "board", CLOSED],
        vec!["board", CLOSED, "board", OPENED, CLOSED, OPENED],
    ];

    for sequence in sequences {
        let mut sync = synchronizer(RecordingSink::default());
        let mut expected = RegistrationPhase::Closed;

        for (index, step) in sequence.iter().enumerate() {
            match *step {
                "board" => sync.on_message(&leader_board_frame(json!([{"name": index}]))),
                frame => {
                    expected = if frame == OPENED {
                        RegistrationPhase::Open
                    } else {
                        RegistrationPhase::Closed
                    };
                    sync.on_message(frame);
                }
            }
        }

        assert_eq!(
            sync.snapshot().registration,
            expected,
            "sequence {sequence:?}"
        );
    }
}

/// **VALUE**: Verifies full replace semantics for leader boards.
///
/// **BUG THIS CATCHES**: Would catch a merge (appending or patching entries) instead of
/// discarding the previous board, which would leave eliminated players on screen.
#[test]
fn given_successive_leader_boards_when_applied_then_only_latest_remains() {
    // GIVEN: A synchronizer that has seen a three-entry board
    let mut sync = synchronizer(RecordingSink::default());
    sync.on_message(&leader_board_frame(json!([
        {"name": "A", "score": 1},
        {"name": "B", "score": 2},
        {"name": "C", "score": 3}
    ])));

    // WHEN: A shorter board arrives, then an empty one, then a final one
    sync.on_message(&leader_board_frame(json!([{"name": "D", "score": 9}])));
    sync.on_message(&leader_board_frame(json!([])));
    sync.on_message(&leader_board_frame(json!([{"name": "E", "rank": 1}])));

    // THEN: Exactly the last payload is kept
    let ui = serde_json::to_value(sync.snapshot().ui_state()).unwrap();
    assert_eq!(ui["leaderBoard"], json!([{"name": "E", "rank": 1}]));
}

/// **VALUE**: Verifies unknown frame types change nothing.
///
/// **WHY THIS MATTERS**: Future servers may add frame types. Old clients must keep working.
#[test]
fn given_unknown_frame_type_when_applied_then_state_unchanged() {
    // GIVEN: A synchronizer with some state
    let mut sync = synchronizer(RecordingSink::default());
    sync.on_open();
    sync.on_message(OPENED);
    sync.on_message(&leader_board_frame(json!([{"name": "A"}])));
    let before = sync.snapshot();
    let mut observer = sync.subscribe();
    observer.mark_unchanged();

    // WHEN: An unknown frame arrives
    sync.on_message(r#"{"type":"countdown","seconds":3}"#);

    // THEN: State unchanged and no notification
    assert_eq!(sync.snapshot(), before);
    assert!(!observer.has_changed().unwrap());
}

/// **VALUE**: Verifies malformed frames are skipped rather than fatal.
///
/// **WHY THIS MATTERS**: One bad frame from the server must not crash the session or
/// wipe what is on screen.
///
/// **BUG THIS CATCHES**: Would catch an `unwrap()` on parse, or treating a `leaderBoard`
/// frame without its payload as "empty board".
#[test]
fn given_malformed_frames_when_applied_then_state_unchanged() {
    let mut sync = synchronizer(RecordingSink::default());
    sync.on_message(OPENED);
    sync.on_message(&leader_board_frame(json!([{"name": "A", "score": 10}])));
    let before = sync.snapshot();

    for frame in [
        "",
        "{",
        "null",
        r#"{"no_type":true}"#,
        r#"{"type":"leaderBoard"}"#,
        r#"{"type":"leaderBoard","leaderBoard":"oops"}"#,
        r#"{"type":42}"#,
    ] {
        sync.on_message(frame);
        assert_eq!(sync.snapshot(), before, "frame {frame:?} changed state");
    }
}

/// **VALUE**: Verifies open/close set the connected flag and are idempotent.
#[test]
fn given_repeated_open_and_close_events_when_applied_then_connected_flag_follows_last() {
    let mut sync = synchronizer(RecordingSink::default());

    sync.handle_event(ConnectionEvent::Opened);
    sync.handle_event(ConnectionEvent::Opened);
    assert!(sync.snapshot().connected());

    sync.handle_event(ConnectionEvent::Closed);
    sync.handle_event(ConnectionEvent::Closed);
    assert!(!sync.snapshot().connected());

    sync.handle_event(ConnectionEvent::Opened);
    assert!(sync.snapshot().connected());
}

/// **VALUE**: Verifies a disconnect leaves phase and board alone.
///
/// **WHY THIS MATTERS**: During a brief network drop the user should keep seeing the
/// last known standings, flagged as disconnected, not an empty page.
#[test]
fn given_state_when_disconnected_and_reconnected_then_phase_and_board_survive() {
    // GIVEN: Connected with an open phase and a board
    let mut sync = synchronizer(RecordingSink::default());
    sync.handle_event(ConnectionEvent::Opened);
    sync.handle_event(ConnectionEvent::Message(OPENED.to_string()));
    sync.handle_event(ConnectionEvent::Message(leader_board_frame(
        json!([{"name": "A", "score": 10}]),
    )));
    let before = sync.snapshot();

    // WHEN: The connection drops
    sync.handle_event(ConnectionEvent::Closed);

    // THEN: Only the connected flag changed
    let during = sync.snapshot();
    assert_eq!(during.connection, ConnectionState::Disconnected);
    assert_eq!(during.registration, before.registration);
    assert_eq!(during.leader_board, before.leader_board);

    // WHEN: It comes back
    sync.handle_event(ConnectionEvent::Opened);

    // THEN: Same as before the gap
    assert_eq!(sync.snapshot(), before);
}

/// **VALUE**: Verifies a connected submit sends exactly one `user` frame and locks the form.
///
/// **BUG THIS CATCHES**: Would catch a wrong frame shape, a duplicate send, or the
/// input buffer not being cleared after submit.
#[test]
fn given_connected_when_submitted_then_one_user_frame_sent_and_form_disabled() {
    // GIVEN: A connected synchronizer with a filled-in form
    let mut sync = synchronizer(RecordingSink::connected());
    sync.on_open();
    sync.set_field("name", "Ada");
    sync.set_field("email", "ada@example.com");

    // WHEN: Submitting
    let outcome = sync.submit();

    // THEN: One frame, form disabled, input cleared
    assert_eq!(outcome, SubmitOutcome::Sent);
    assert_eq!(
        sync.sink().frames(),
        vec![json!({"type": "user", "user": {"name": "Ada", "email": "ada@example.com"}})]
    );
    assert!(sync.snapshot().form_disabled);
    assert!(sync.input().fields().is_empty());
}

/// **VALUE**: Verifies a disconnected submit sends nothing, raises nothing, and still
/// disables the form.
///
/// **WHY THIS MATTERS**: Delivery is at-most-once; the default policy keeps the one-shot
/// guard even when the frame could not be sent.
#[test]
fn given_disconnected_when_submitted_then_no_frame_and_form_still_disabled() {
    let mut sync = synchronizer(RecordingSink::default());
    sync.set_field("name", "Ada");

    let outcome = sync.submit();

    assert_eq!(outcome, SubmitOutcome::Dropped);
    assert!(sync.sink().frames().is_empty());
    assert!(sync.snapshot().form_disabled);
    assert!(sync.input().fields().is_empty());
}

/// **VALUE**: Verifies the one-shot guard: a second submit does nothing.
#[test]
fn given_submitted_form_when_submitted_again_then_no_second_frame() {
    let mut sync = synchronizer(RecordingSink::connected());
    sync.set_field("name", "Ada");
    assert_eq!(sync.submit(), SubmitOutcome::Sent);

    let accepted = sync.set_field("name", "Bob");
    let outcome = sync.submit();

    assert!(!accepted, "Input should be refused once the form is disabled");
    assert_eq!(outcome, SubmitOutcome::AlreadySubmitted);
    assert_eq!(sync.sink().frames().len(), 1);
}

#[test]
fn given_empty_form_when_submitted_then_rejected_and_form_stays_enabled() {
    let mut sync = synchronizer(RecordingSink::connected());
    sync.set_field("name", "");

    let outcome = sync.submit();

    assert_eq!(outcome, SubmitOutcome::Rejected);
    assert!(sync.sink().frames().is_empty());
    assert!(!sync.snapshot().form_disabled);
}

/// **VALUE**: Verifies the alternative form policy keeps the user able to retry.
///
/// **WHY THIS MATTERS**: Under the default policy one click while disconnected locks the
/// user out until reload. `UnlockOnDroppedSend` exists to avoid that.
#[test]
fn given_unlock_policy_when_submit_dropped_then_form_and_input_kept_for_retry() {
    // GIVEN: Unlock policy, disconnected, form filled in
    let mut sync =
        ClientSynchronizer::new(RecordingSink::default(), FormLockPolicy::UnlockOnDroppedSend);
    sync.set_field("name", "Ada");

    // WHEN: Submitting while disconnected
    let outcome = sync.submit();

    // THEN: Dropped, but form still enabled with its input
    assert_eq!(outcome, SubmitOutcome::Dropped);
    assert!(!sync.snapshot().form_disabled);
    assert_eq!(sync.input().fields()["name"], "Ada");

    // WHEN: Connection returns and the user retries
    sync.sink().connected.set(true);
    let retry = sync.submit();

    // THEN: Sent and locked
    assert_eq!(retry, SubmitOutcome::Sent);
    assert_eq!(sync.sink().frames().len(), 1);
    assert!(sync.snapshot().form_disabled);
}

/// **VALUE**: Verifies subscribers are notified when the snapshot changes.
///
/// **WHY THIS MATTERS**: The rendering layer redraws only on notification. A missed
/// notification leaves the screen stale.
#[tokio::test]
async fn given_subscriber_when_state_changes_then_notified_with_new_snapshot() {
    // GIVEN: A subscriber
    let mut sync = synchronizer(RecordingSink::default());
    let mut observer = sync.subscribe();

    // WHEN: A phase frame is applied
    sync.on_message(OPENED);

    // THEN: The subscriber sees the change
    assert!(observer.has_changed().unwrap());
    let seen = observer.borrow_and_update().clone();
    assert_eq!(seen.registration, RegistrationPhase::Open);

    // WHEN: The same frame is applied again
    sync.on_message(OPENED);

    // THEN: No spurious notification
    assert!(!observer.has_changed().unwrap());
}

#[test]
fn given_field_set_then_cleared_when_submitted_then_cleared_field_not_sent() {
    let mut sync = synchronizer(RecordingSink::connected());
    sync.on_open();
    sync.set_field("name", "Ada");
    sync.set_field("nickname", "countess");

    assert!(sync.clear_field("nickname"));
    assert!(!sync.clear_field("never-set"));
    sync.submit();

    assert_eq!(
        sync.sink().frames(),
        vec![json!({"type": "user", "user": {"name": "Ada"}})]
    );
}

/// **VALUE**: Verifies a disabled form accepts no more edits.
///
/// **BUG THIS CATCHES**: Would catch input edited after submit leaking into a later
/// submission if the form were ever unlocked.
#[test]
fn given_submitted_form_when_fields_edited_then_edits_ignored() {
    // GIVEN: A form that has been submitted
    let mut sync = synchronizer(RecordingSink::connected());
    sync.on_open();
    sync.set_field("name", "Ada");
    sync.submit();

    // WHEN: Editing fields
    let set = sync.set_field("name", "Grace");
    let cleared = sync.clear_field("name");

    // THEN: Both refused, input stays empty
    assert!(!set);
    assert!(!cleared);
    assert!(sync.input().fields().is_empty());
}
