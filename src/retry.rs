//! Exponential backoff for a single outbound request.
//!
//! A failed attempt is shown to a classifier; transient errors are retried
//! after `base * 2^n` seconds until the budget runs out.

use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    Retry,
    Abort,
}

/// Backoff schedule. Defaults give waits of 2s, 4s, 8s.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay_secs: u64,
    /// Upper bound on any single wait.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_secs: 2,
            max_delay_secs: 3600,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Wait before retry number `retry` (0-indexed).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
        let secs = self.base_delay_secs.saturating_mul(factor);
        Duration::from_secs(secs.min(self.max_delay_secs))
    }
}

/// Run `operation` until it succeeds, the classifier says `Abort`, or
/// `max_retries` retries have been spent. The last error is returned.
pub async fn retry_with_backoff<F, Fut, T, E, C>(
    config: &RetryConfig,
    classifier: C,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> RetryAction,
    E: std::fmt::Display,
{
    let mut retry = 0;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        if retry >= config.max_retries || classifier(&err) == RetryAction::Abort {
            return Err(err);
        }
        let delay = config.delay_for_retry(retry);
        tracing::warn!("{}, retrying in {}s...", err, delay.as_secs());
        tokio::time::sleep(delay).await;
        retry += 1;
    }
}
