use std::time::Duration;

use backoff::ExponentialBackoff;

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(3000);
pub const DEFAULT_GROWTH_FACTOR: f64 = 1.5;
pub const DEFAULT_RANDOMIZATION_FACTOR: f64 = 0.0;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(2000);

/// How long to wait between reconnection attempts.
///
/// The first retry waits `base_delay`; each following one multiplies the delay
/// by `growth_factor` until it reaches `max_delay`. A successful connection
/// resets the delay to `base_delay`. There is no retry limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub growth_factor: f64,
    /// Jitter as a fraction of the current delay; `0.0` disables it.
    pub randomization_factor: f64,
    /// An attempt that has not completed the handshake by then counts as failed.
    pub connect_timeout: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            randomization_factor: DEFAULT_RANDOMIZATION_FACTOR,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ReconnectPolicy {
    /// Backoff schedule for this policy. Never runs out.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.base_delay,
            initial_interval: self.base_delay,
            randomization_factor: self.randomization_factor,
            multiplier: self.growth_factor,
            max_interval: self.max_delay,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}
