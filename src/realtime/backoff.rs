// Reconnect delay schedule
//
// Exponential: base * factor^attempt, capped at max. Consecutive failures
// never shorten the delay; a successful connect resets the schedule.

use std::time::Duration;

/// Backoff parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max: Duration,
    pub factor: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(1000),
            max: Duration::from_millis(30_000),
            factor: 2,
        }
    }
}

/// Reconnect attempt counter for one channel
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    attempt: u32,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Delay before the next attempt, advancing the schedule
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.delay_for(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Back to base after a successful connect
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Failures since the last successful connect
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let base_ms = self.policy.base.as_millis() as u64;
        let max_ms = self.policy.max.as_millis() as u64;
        let factor = u64::from(self.policy.factor.max(1));

        let ms = factor
            .checked_pow(attempt)
            .map_or(max_ms, |mult| base_ms.saturating_mul(mult));
        Duration::from_millis(ms.min(max_ms).max(base_ms.min(max_ms)))
    }
}
