//! Bounded retry policy for the LLM client.
//!
//! Kept as a pure type so the policy is testable without HTTP: the client
//! loop asks `delay_for` what to do after each failed attempt.

use std::time::Duration;

use crate::errors::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct RetrySchedule {
    /// Retries after the first attempt; 3 means up to 4 attempts total.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetrySchedule {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Capped exponential backoff: base, 2*base, 4*base, ... up to max_delay.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(16);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Delay before re-attempting after `error`, or `None` to give up.
    ///
    /// `attempt` counts completed attempts, zero-based. A 429's advertised
    /// delay takes precedence over backoff but still spends the same budget.
    pub fn delay_for(&self, error: &ApiError, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries || !error.retryable() {
            return None;
        }
        Some(error.retry_after().unwrap_or_else(|| self.backoff(attempt)))
    }
}
