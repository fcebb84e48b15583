//! Retry policy for page fetches.
//!
//! Exponential backoff with configurable parameters. With `max_retries = 0`
//! a fetch is attempted exactly once.

use crate::config::ExtractionSettings;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    /// Cap for exponential growth.
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    pub fn new(config: &ExtractionSettings) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff_ms: config.initial_backoff_ms,
            max_backoff_ms: config.max_backoff_ms,
            backoff_multiplier: config.backoff_multiplier,
        }
    }

    /// `initial_backoff * multiplier^retry_count`, capped at `max_backoff_ms`.
    pub fn backoff(&self, retry_count: u32) -> Duration {
        let backoff =
            self.initial_backoff_ms as f64 * self.backoff_multiplier.powi(retry_count as i32);
        Duration::from_millis(backoff.min(self.max_backoff_ms as f64) as u64)
    }

    pub fn should_retry(&self, retryable: bool, retry_count: u32) -> bool {
        retryable && retry_count < self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(&ExtractionSettings::default())
    }
}
