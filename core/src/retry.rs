//! Caller-side retry with exponential backoff.
//!
//! The dispatcher never retries on its own. A caller that wants retries wraps
//! call construction in [`with_retry`], which issues a fresh call per attempt
//! and only repeats failures for which [`ApiError::is_retryable`] holds.

use std::time::Duration;

use tracing::warn;

use crate::dispatcher::CallHandle;
use crate::error::ApiError;

pub const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(1);
pub const RETRY_MULTIPLIER: f64 = 2.0;
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);
pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total dispatches, including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_delay: INITIAL_RETRY_DELAY,
            multiplier: RETRY_MULTIPLIER,
            max_delay: MAX_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self::attempts(1)
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        let scaled = Duration::try_from_secs_f64(delay.as_secs_f64() * self.multiplier)
            .unwrap_or(self.max_delay);
        scaled.min(self.max_delay)
    }
}

/// Run `make_call` until it succeeds, fails permanently, or the policy runs
/// out of attempts. Returns the last error in the latter two cases.
#[tracing::instrument(skip(policy, make_call))]
pub async fn with_retry<T, F>(
    policy: &RetryPolicy,
    endpoint: &str,
    mut make_call: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> CallHandle<T>,
{
    let attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut attempt = 1;
    loop {
        match make_call().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < attempts => {
                warn!(attempt, ?delay, error = %err, "retrying {endpoint}");
                tokio::time::sleep(delay).await;
                delay = policy.next_delay(delay);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
