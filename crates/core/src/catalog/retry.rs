//! Bounded exponential backoff for catalog requests.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::CatalogError;
use crate::config::RetryConfig;

/// Retry policy: `max_attempts` tries, delays doubling from `base_delay`,
/// capped at `max_delay`, plus up to `jitter` of random noise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Creates a policy without jitter. `max_attempts` is clamped to at least 1.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            jitter: Duration::ZERO,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
        .with_jitter(Duration::from_millis(config.jitter_ms))
    }

    /// Sets the jitter upper bound.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Backoff before the attempt following `attempt` (1-based), without jitter.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    fn delay_before_retry(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let mut delay = self.backoff_delay(attempt);
        if let Some(requested) = retry_after {
            delay = delay.max(requested).min(self.max_delay);
        }
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms > 0 {
            delay += Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms));
        }
        delay
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or
    /// `max_attempts` is reached. `op` receives the 1-based attempt number.
    pub async fn execute<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, CatalogError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, CatalogError>>,
    {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            debug!("{} (attempt {}/{})", what, attempt, self.max_attempts);

            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < self.max_attempts {
                        let delay = self.delay_before_retry(attempt, e.retry_after());
                        warn!(
                            "{} failed (attempt {}/{}): {}; retrying in {:?}",
                            what, attempt, self.max_attempts, e, delay
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        warn!(
            "{} failed after {} attempts: {}",
            what, self.max_attempts, last_error
        );
        Err(CatalogError::RetriesExhausted {
            attempts: self.max_attempts,
            last_error,
        })
    }
}
