//! Platform-agnostic reconnection backoff.
//!
//! Free of any runtime dependency; the client owns the socket and the timer
//! and asks this for the next delay.

use std::time::Duration;

use super::shared::{
    BACKOFF_MULTIPLIER, INITIAL_RETRY_DELAY_MS, MAX_RETRY_ATTEMPTS, MAX_RETRY_DELAY_MS,
};

/// Exponential backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_attempts: u32,
    pub multiplier: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: INITIAL_RETRY_DELAY_MS,
            max_delay_ms: MAX_RETRY_DELAY_MS,
            max_attempts: MAX_RETRY_ATTEMPTS,
            multiplier: BACKOFF_MULTIPLIER,
        }
    }
}

/// Exponential backoff state shared by reconnect logic.
#[derive(Debug, Clone, Copy)]
pub struct BackoffState {
    policy: ReconnectPolicy,
    attempts: u32,
    delay_ms: u64,
}

impl Default for BackoffState {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}

impl BackoffState {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
            delay_ms: policy.initial_delay_ms,
        }
    }

    /// Start over after a connection opened successfully.
    pub fn reset(&mut self) {
        *self = Self::new(self.policy);
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.policy.max_attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.policy.max_attempts
    }

    /// Advance to the next attempt, updating the delay for the subsequent attempt.
    ///
    /// Returns the delay to wait *before* performing this attempt.
    pub fn next_delay_and_advance(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }

        let current_delay = self.delay_ms;
        self.attempts += 1;
        self.delay_ms = ((self.delay_ms as f64) * self.policy.multiplier)
            .min(self.policy.max_delay_ms as f64) as u64;
        Some(Duration::from_millis(current_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_up_to_the_cap() {
        let mut backoff = BackoffState::default();
        let delays: Vec<u64> = std::iter::from_fn(|| backoff.next_delay_and_advance())
            .map(|d| d.as_millis() as u64)
            .collect();

        assert_eq!(
            delays,
            vec![1_000, 2_000, 4_000, 8_000, 16_000, 30_000, 30_000, 30_000, 30_000, 30_000]
        );
        assert!(backoff.is_exhausted());
        assert_eq!(backoff.attempts(), 10);
    }

    #[test]
    fn reset_starts_from_the_initial_delay() {
        let mut backoff = BackoffState::default();
        backoff.next_delay_and_advance();
        backoff.next_delay_and_advance();
        backoff.reset();

        assert_eq!(backoff.attempts(), 0);
        assert_eq!(
            backoff.next_delay_and_advance(),
            Some(Duration::from_millis(1_000))
        );
    }

    #[test]
    fn custom_policy_is_honoured() {
        let mut backoff = BackoffState::new(ReconnectPolicy {
            initial_delay_ms: 10,
            max_delay_ms: 25,
            max_attempts: 3,
            multiplier: 2.0,
        });
        assert_eq!(backoff.next_delay_and_advance(), Some(Duration::from_millis(10)));
        assert_eq!(backoff.next_delay_and_advance(), Some(Duration::from_millis(20)));
        assert_eq!(backoff.next_delay_and_advance(), Some(Duration::from_millis(25)));
        assert_eq!(backoff.next_delay_and_advance(), None);
    }
}
