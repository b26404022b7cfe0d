use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::error::ServiceError;
use crate::domain::models::RetryConfig;

/// Retry policy for remote service calls.
///
/// Only transient errors (rate limit, 5xx, timeout, network) are retried,
/// with exponential backoff capped at `max_backoff_ms`. Permanent errors
/// and the final transient error are returned unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    pub const fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            config.initial_backoff_ms,
            config.max_backoff_ms,
        )
    }

    /// A policy that makes exactly one attempt.
    pub const fn none() -> Self {
        Self::new(0, 1, 1)
    }

    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn schedule(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(self.initial_backoff_ms))
            .with_max_interval(Duration::from_millis(self.max_backoff_ms))
            .with_multiplier(2.0)
            .with_randomization_factor(0.0)
            .with_max_elapsed_time(None)
            .build()
    }

    /// Run `operation` until it succeeds, fails permanently, or retries run out.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let attempts = AtomicU32::new(0);
        let max_retries = self.max_retries;

        let result = backoff::future::retry_notify(
            self.schedule(),
            || {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                let call = operation();
                async move {
                    call.await.map_err(|err| {
                        if err.is_transient() && attempt < max_retries {
                            backoff::Error::transient(err)
                        } else {
                            backoff::Error::permanent(err)
                        }
                    })
                }
            },
            |err: ServiceError, wait: Duration| {
                warn!(
                    attempt = attempts.load(Ordering::SeqCst),
                    max_retries = max_retries,
                    wait_ms = wait.as_millis() as u64,
                    error = %err,
                    "transient service error, retrying"
                );
            },
        )
        .await;

        let made = attempts.load(Ordering::SeqCst);
        match &result {
            Ok(_) if made > 1 => debug!(attempts = made, "operation succeeded after retry"),
            Err(err) if err.is_transient() => {
                warn!(attempts = made, error = %err, "retries exhausted");
            }
            _ => {}
        }
        result
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
