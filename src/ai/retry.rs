//! Retry Policy
//!
//! Re-attempts a failed generation call with exponential backoff.
//!
//! - Only errors whose category is retryable get another attempt
//!   (timeout, network, transient, parse); auth, quota and bad-request
//!   failures surface immediately
//! - Delays double from the base delay: 1s, 2s by default
//! - After the last retry the final error is returned unchanged

use backon::{BackoffBuilder, ExponentialBuilder, Retryable};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::constants::retry as retry_constants;
use crate::types::{ReverieError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Retries after the initial attempt
    pub max_retries: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(retry_constants::BASE_DELAY_MS),
            max_retries: retry_constants::MAX_RETRIES,
        }
    }
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, max_retries: usize) -> Self {
        Self {
            base_delay,
            max_retries,
        }
    }

    /// Single attempt, no backoff
    pub fn no_retry() -> Self {
        Self::new(Duration::ZERO, 0)
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_factor(retry_constants::BACKOFF_FACTOR)
            .with_max_times(self.max_retries)
    }

    /// Waits between attempts, in order
    pub fn delays(&self) -> Vec<Duration> {
        self.backoff().build().collect()
    }

    /// Run `operation` until it succeeds, fails permanently, or retries run out
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        operation
            .retry(self.backoff())
            .sleep(tokio::time::sleep)
            .when(ReverieError::is_retryable)
            .notify(|err: &ReverieError, delay: Duration| {
                warn!(
                    error = %err,
                    category = %err.category(),
                    delay_ms = delay.as_millis() as u64,
                    "Generation attempt failed, retrying"
                );
            })
            .await
    }
}
