//! Retry with exponential back-off and jitter for provider calls.
//!
//! [`retry_with_backoff`] wraps any fallible blocking operation and retries
//! it on transient errors (see [`ProviderError::is_retriable`]). Everything
//! else is returned immediately.

use std::thread;
use std::time::Duration;

use crate::error::ProviderError;

const MAX_DELAY_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff_base_ms: 500,
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    /// Delay before retry number `attempt` (1-based), before jitter.
    fn base_delay_ms(&self, attempt: u32) -> u64 {
        self.backoff_base_ms
            .saturating_mul(1u64 << (attempt - 1).min(10))
            .min(MAX_DELAY_MS)
    }
}

/// Runs `operation` with up to `policy.max_retries` additional attempts.
///
/// Each retry sleeps `backoff_base_ms * 2^(attempt-1)` with +/-25% jitter,
/// capped at 30 s.
pub fn retry_with_backoff<T, F>(
    policy: &RetryPolicy,
    what: &str,
    mut operation: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Result<T, ProviderError>,
{
    let mut attempt = 0u32;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retriable() || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let capped = policy.base_delay_ms(attempt);
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    what,
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "transient provider error, retrying after back-off"
                );
                thread::sleep(Duration::from_millis(delay_ms));
            }
        }
    }
}
