//! Bounded retry for outbound search calls.
//!
//! Backends call through [`with_retry`] so an operator can opt into
//! retries via `STREAMTUNE_MAX_RETRIES`. With the default policy the
//! operation runs exactly once.

use crate::config::RetryPolicy;
use crate::providers::error::SearchError;
use std::future::Future;

pub async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    operation: &str,
    mut attempt: F,
) -> Result<T, SearchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SearchError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut tries = 0;

    loop {
        tries += 1;
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && tries < max_attempts => {
                log::warn!(
                    "[{}/{}] {} failed: {}, retrying in {:?}",
                    tries,
                    max_attempts,
                    operation,
                    e,
                    policy.backoff
                );
                if !policy.backoff.is_zero() {
                    tokio::time::sleep(policy.backoff).await;
                }
            }
            Err(e) => return Err(e),
        }
    }
}
