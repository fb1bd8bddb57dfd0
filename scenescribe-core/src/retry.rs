//! Explicit retry policy for collaborator calls.
//!
//! The pipeline driver applies one [`RetryPolicy`] uniformly around every
//! external-collaborator call instead of scattering ad hoc retry logic across
//! call sites. Only transient errors (`CollaboratorTimeout`,
//! `CollaboratorFailure`) are retried; malformed input and cancellation
//! surface immediately.

use crate::cancel::CancellationToken;
use crate::error::{CoreError, CoreResult};

use std::time::Duration;

/// Bounded exponential backoff: attempt `n` (1-based) sleeps
/// `min(base_delay * 2^(n-1), max_delay)` before retrying.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,

    /// Delay before the first retry.
    pub base_delay: Duration,

    /// Upper bound on any single backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // Mirrors the bounded random-wait retry the pipeline previously relied
        // on: up to 7 attempts with waits between 1 and 2 seconds.
        Self {
            max_attempts: 7,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// Backoff delay preceding the given retry (1-based attempt that failed).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Runs `operation` until it succeeds, fails with a non-transient error,
    /// the attempt budget is exhausted, or the token is cancelled.
    pub fn run<T, F>(&self, cancel: &CancellationToken, mut operation: F) -> CoreResult<T>
    where
        F: FnMut() -> CoreResult<T>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            cancel.check()?;

            match operation() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < attempts => {
                    let delay = self.delay_for_attempt(attempt);
                    log::warn!(
                        "Transient collaborator error (attempt {}/{}), retrying in {:?}: {}",
                        attempt,
                        attempts,
                        delay,
                        err
                    );
                    last_error = Some(err);
                    std::thread::sleep(delay);
                }
                Err(err) => return Err(err),
            }
        }

        // Unreachable unless max_attempts is 0, which max(1) rules out; the
        // final failing attempt returns from the loop above.
        Err(last_error.unwrap_or(CoreError::Cancelled))
    }
}
