//! Bounded retry with exponential backoff for transient model failures

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: usize,
    /// Delay before the first retry; doubles each retry
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_backoff_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_backoff_ms: 0,
        }
    }

    /// Backoff before retry number `retry` (1-based)
    #[must_use]
    pub fn backoff(&self, retry: usize) -> Duration {
        let shift = u32::try_from(retry.saturating_sub(1)).unwrap_or(u32::MAX).min(16);
        Duration::from_millis(self.base_backoff_ms.saturating_mul(1u64 << shift))
    }

    /// Run `op`, retrying only errors classified as retryable
    ///
    /// # Errors
    /// The last error once attempts are exhausted, or the first
    /// non-retryable error
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ModelError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ModelError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts && err.is_retryable() => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(attempt, ?delay, "transient model error, retrying: {}", err);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_backoff_ms: 100,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_until_success() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let policy = RetryPolicy {
            max_attempts: 3,
            base_backoff_ms: 10,
        };

        let result = policy
            .run(move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ModelError::Transport("reset".into()))
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_retry_permanent_errors() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let policy = RetryPolicy::default();

        let result: Result<(), _> = policy
            .run(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ModelError::ModelNotFound("gone".into()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let policy = RetryPolicy {
            max_attempts: 2,
            base_backoff_ms: 1,
        };

        let result: Result<(), _> = policy
            .run(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ModelError::Status { status: 503, message: "busy".into() })
            })
            .await;

        assert!(matches!(result, Err(ModelError::Status { status: 503, .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
