// src/utils/retry.rs

//! Retry loop shared by the page fetcher and the notifier.

use std::future::Future;

use crate::error::Result;
use crate::models::RetryPolicy;

/// Run `op` until it succeeds or the policy runs out of attempts.
///
/// Sleeps `policy.delay()` between attempts, never after the last one.
/// Returns the number of attempts used alongside the result; the error is
/// the one from the final attempt.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> (u32, Result<T>)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return (attempt, Ok(value)),
            Err(error) if attempt < max_attempts => {
                log::warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {}ms",
                    label,
                    attempt,
                    max_attempts,
                    error,
                    policy.delay_ms
                );
                if policy.delay_ms > 0 {
                    tokio::time::sleep(policy.delay()).await;
                }
                attempt += 1;
            }
            Err(error) => return (attempt, Err(error)),
        }
    }
}
