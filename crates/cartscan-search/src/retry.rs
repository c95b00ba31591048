//! Fixed-count retry for grocery-search requests.
//!
//! [`RetryPolicy`] says how many extra attempts a request gets, how long to
//! wait between them, and which [`FetchErrorKind`]s are worth another try.
//! The default retries every kind of request failure three times with no
//! wait in between.

use std::future::Future;
use std::time::Duration;

use crate::error::{FetchError, FetchErrorKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed after the first failure.
    pub max_retries: u32,
    /// Pause before each retry.
    pub delay_between: Duration,
    pub retryable: Vec<FetchErrorKind>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay_between: Duration::ZERO,
            retryable: vec![
                FetchErrorKind::Transport,
                FetchErrorKind::Upstream,
                FetchErrorKind::Decode,
            ],
        }
    }
}

impl RetryPolicy {
    /// Default retryable kinds with a custom retry count.
    #[must_use]
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// A policy that makes exactly one attempt.
    #[must_use]
    pub fn no_retries() -> Self {
        Self::with_max_retries(0)
    }

    #[must_use]
    pub fn is_retryable(&self, err: &FetchError) -> bool {
        self.retryable.contains(&err.kind())
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// has been retried `policy.max_retries` times. The last error is returned.
pub(crate) async fn retry_with_policy<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !policy.is_retryable(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    error = %err,
                    "search request failed, retrying"
                );
                if !policy.delay_between.is_zero() {
                    tokio::time::sleep(policy.delay_between).await;
                }
            }
        }
    }
}
