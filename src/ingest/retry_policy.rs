//! Retry policy for chunk writes.
//!
//! Defaults to a fixed delay; a multiplier above 1.0 turns it into
//! exponential backoff capped at `max_delay_secs`.

use crate::config::ImportSettings;
use crate::graph::GraphError;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per chunk, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt, in seconds.
    pub delay_secs: u64,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,
    /// Cap for exponential growth.
    pub max_delay_secs: u64,
}

impl RetryPolicy {
    pub fn new(settings: &ImportSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            delay_secs: settings.retry_delay_secs,
            backoff_multiplier: settings.backoff_multiplier,
            max_delay_secs: settings.max_delay_secs,
        }
    }

    /// Check if a failed `attempt` (1-based) should be followed by another.
    ///
    /// Returns true if:
    /// - The error is retryable (e.g., not a rejected query)
    /// - Fewer than max_attempts attempts were made
    pub fn should_retry(&self, error: &GraphError, attempt: u32) -> bool {
        error.is_retryable() && attempt < self.max_attempts
    }

    /// Delay in seconds to wait after a failed `attempt` (1-based).
    pub fn delay_secs_for(&self, attempt: u32) -> f64 {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay = self.delay_secs as f64 * self.backoff_multiplier.powi(exponent);
        delay.min(self.max_delay_secs.max(self.delay_secs) as f64)
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_secs_f64(self.delay_secs_for(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_secs: 3,
            backoff_multiplier: 1.0,
            max_delay_secs: 60,
        }
    }
}
