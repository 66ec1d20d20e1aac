//! Retry policy for provider fetches.
//!
//! A failed fetch is retried at most once: market data either arrives within the
//! request budget or the request fails.

use std::time::Duration;

/// Upper bound on retries regardless of configuration.
pub const MAX_RETRIES: u32 = 1;

/// Configuration for the fetch retry mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt, capped at [`MAX_RETRIES`].
    pub max_retries: u32,
    /// Pause before a retry.
    pub delay: Duration,
    /// Whether to apply random jitter (+/- 50%) to the delay.
    pub jitter: bool,
    /// HTTP status codes that count as transient.
    pub retry_on_status: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            delay: Duration::from_millis(250),
            jitter: true,
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// Fixed delay without jitter, capped at one retry.
    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries: max_retries.min(MAX_RETRIES),
            delay,
            jitter: false,
            ..Self::default()
        }
    }

    /// Disable retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Total number of attempts including the first one.
    pub fn attempts(&self) -> u32 {
        self.max_retries.min(MAX_RETRIES) + 1
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    /// Delay to wait before the next attempt.
    pub fn next_delay(&self) -> Duration {
        if !self.jitter {
            return self.delay;
        }

        let delay_ms = self.delay.as_millis() as u64;
        let jitter_ms = delay_ms / 2;
        let offset = fastrand::u64(0..=(jitter_ms * 2));
        Duration::from_millis(delay_ms - jitter_ms + offset)
    }
}
