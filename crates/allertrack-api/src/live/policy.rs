// Reconnect policy and retry bookkeeping for the live channel.
//
// Pure, clock-free logic so the backoff schedule is testable without
// sockets or timers. The channel loop (mod.rs) owns the actual sleeps.

use std::time::Duration;

/// Bounded exponential backoff configuration.
///
/// Defaults reproduce the schedule 1, 2, 4, 8, 16, 30, 30, 30, 30, 30
/// seconds over ten retries, after which the channel gives up until
/// reopened.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub base_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Retry ceiling: consecutive failed cycles before giving up
    /// permanently. Default: 10.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_attempts: 10,
        }
    }
}

impl ReconnectPolicy {
    /// Backoff delay for a given attempt: `min(base * 2^attempt, max)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// What the channel loop should do after a connection terminates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryAction {
    /// Sleep for the given delay, then reconnect.
    Sleep(Duration),
    /// Retry ceiling reached: enter the terminal closed state.
    GiveUp,
}

/// Consecutive-failure counter driving the retry state machine.
///
/// A successful handshake resets the counter, so a long-lived connection
/// that later drops starts backing off from the base delay again.
#[derive(Debug, Default)]
pub struct RetryState {
    attempt: u32,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current consecutive-failure count.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Record a successful handshake.
    pub fn connected(&mut self) {
        self.attempt = 0;
    }

    /// Record a terminated connection and decide the next transition.
    pub fn disconnected(&mut self, policy: &ReconnectPolicy) -> RetryAction {
        if self.attempt >= policy.max_attempts {
            return RetryAction::GiveUp;
        }
        let delay = policy.delay_for(self.attempt);
        self.attempt += 1;
        RetryAction::Sleep(delay)
    }
}
