use std::time::Duration;

use crate::foundation::{
    config::RetryConfig,
    error::{StoryError, StoryResult},
};

/// Exponential backoff around a fallible collaborator call.
///
/// Attempts run sequentially on the calling thread, so wrapping a call never changes the order
/// in which segments are processed. Malformed input is never retried.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    multiplier: f64,
    max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            initial_backoff: Duration::from_millis(cfg.initial_backoff_ms),
            multiplier: cfg.multiplier.max(1.0),
            max_backoff: Duration::from_millis(cfg.max_backoff_ms),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before attempt `attempt + 1`, where `attempt` counts from 1.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(63) as i32;
        let ms = self.initial_backoff.as_millis() as f64 * self.multiplier.powi(exp);
        let capped = ms.min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error or attempts run out.
    /// The last error is returned unchanged.
    pub fn run<T>(&self, what: &str, mut op: impl FnMut() -> StoryResult<T>) -> StoryResult<T> {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(v) => return Ok(v),
                Err(e) if attempt >= self.max_attempts || !is_retryable(&e) => return Err(e),
                Err(e) => {
                    let delay = self.backoff_after(attempt);
                    tracing::warn!(
                        call = what,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "collaborator call failed, retrying"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

fn is_retryable(e: &StoryError) -> bool {
    !matches!(e, StoryError::MalformedInput { .. })
}

#[cfg(test)]
#[path = "../../tests/unit/generate/retry.rs"]
mod tests;
