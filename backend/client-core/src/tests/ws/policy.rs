// Unit tests for the reconnection backoff schedule

use crate::ws::ReconnectPolicy;

use std::time::Duration;

use backoff::backoff::Backoff;

fn delays(policy: &ReconnectPolicy, count: usize) -> Vec<Duration> {
    let mut backoff = policy.backoff();
    (0..count)
        .map(|_| backoff.next_backoff().expect("backoff should never run out"))
        .collect()
}

/// **VALUE**: Verifies the default schedule grows from 1s by 1.5x and caps at 3s.
///
/// **WHY THIS MATTERS**: The cap bounds how long a user stares at "disconnected" after
/// the server comes back. Without it, delays would grow until reconnection looks dead.
///
/// **BUG THIS CATCHES**: Would catch if `max_interval` or `multiplier` is not wired
/// from the policy into the backoff.
#[test]
fn given_default_policy_when_backing_off_then_grows_to_cap() {
    // GIVEN: The default policy (no jitter)
    let policy = ReconnectPolicy::default();

    // WHEN: Taking the first six delays
    let delays = delays(&policy, 6);

    // THEN: 1000, 1500, 2250, then capped at 3000
    assert_eq!(
        delays,
        vec![
            Duration::from_millis(1000),
            Duration::from_millis(1500),
            Duration::from_millis(2250),
            Duration::from_millis(3000),
            Duration::from_millis(3000),
            Duration::from_millis(3000),
        ]
    );
}

/// **VALUE**: Verifies the schedule never runs out.
///
/// **WHY THIS MATTERS**: Reconnection is attempted indefinitely. The `backoff` crate's
/// default gives up after 15 minutes, which would leave the client disconnected for good.
#[test]
fn given_any_policy_when_backing_off_many_times_then_never_exhausted() {
    let policy = ReconnectPolicy {
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
        ..Default::default()
    };

    let mut backoff = policy.backoff();

    assert_eq!(backoff.max_elapsed_time, None);
    for _ in 0..10_000 {
        assert!(backoff.next_backoff().is_some());
    }
}

/// **VALUE**: Verifies that a reset goes back to the base delay.
///
/// **BUG THIS CATCHES**: Would catch if a successful reconnection kept the grown delay,
/// making the next outage wait the full cap before the first retry.
#[test]
fn given_grown_backoff_when_reset_then_restarts_at_base_delay() {
    // GIVEN: A backoff that has already grown
    let policy = ReconnectPolicy::default();
    let mut backoff = policy.backoff();
    backoff.next_backoff();
    backoff.next_backoff();
    backoff.next_backoff();

    // WHEN: Resetting after a successful connection
    backoff.reset();

    // THEN: Next delay is the base delay again
    assert_eq!(backoff.next_backoff(), Some(policy.base_delay));
}

#[test]
fn given_jitter_when_backing_off_then_delay_stays_within_band() {
    let policy = ReconnectPolicy {
        randomization_factor: 0.5,
        ..Default::default()
    };

    let mut backoff = policy.backoff();
    let first = backoff.next_backoff().unwrap();

    assert!(first >= Duration::from_millis(500), "{first:?} below band");
    assert!(first <= Duration::from_millis(1500), "{first:?} above band");
}
