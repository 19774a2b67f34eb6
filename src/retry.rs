//! Bounded retry with exponential backoff for transient gateway failures.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{Result, TranslateError};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_MULTIPLIER: u32 = 2;
/// Throttling backs off this many times longer than other transient failures.
pub const RATE_LIMIT_FACTOR: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based) after `error`.
    pub fn backoff(&self, retry: u32, error: &TranslateError) -> Duration {
        let factor = self.multiplier.saturating_pow(retry.saturating_sub(1));
        let delay = self.base_delay.saturating_mul(factor);
        if matches!(error, TranslateError::RateLimit(_)) {
            delay.saturating_mul(RATE_LIMIT_FACTOR)
        } else {
            delay
        }
    }

    /// Runs `operation` until it succeeds, fails permanently, runs out of
    /// attempts, or the next backoff would overrun `budget`.
    ///
    /// Each attempt receives the budget that remains as its own timeout; an
    /// attempt that exceeds it counts as a transport timeout.
    pub async fn execute<T, F, Fut>(&self, budget: Duration, mut operation: F) -> Result<T>
    where
        F: FnMut(Duration) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let deadline = Instant::now() + budget;
        let mut attempt = 1;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let outcome = match tokio::time::timeout(remaining, operation(remaining)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(TranslateError::Transport(format!(
                    "request timed out after {}s",
                    budget.as_secs_f32()
                ))),
            };

            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => e,
            };

            if attempt >= self.max_attempts {
                tracing::warn!(attempt, error = %error, "giving up after final attempt");
                return Err(error);
            }

            let delay = self.backoff(attempt, &error);
            if Instant::now() + delay >= deadline {
                tracing::warn!(attempt, error = %error, "retry budget exhausted");
                return Err(error);
            }

            tracing::warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "transient failure, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
