/// Bounded retry with a fixed delay between attempts
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Source of delays. setTimeout-backed in the browser, recorded in tests.
#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Run `op` until it succeeds, fails with an error `is_retryable` rejects, or
/// `policy.max_attempts` attempts have been made. The attempt number (1-based)
/// is passed to `op`. Returns the last error on failure.
pub async fn retry<T, E, F, Fut, P, Tm>(
    policy: &RetryPolicy,
    timer: &Tm,
    is_retryable: P,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
    Tm: Timer + ?Sized,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_attempts || !is_retryable(&err) {
                    return Err(err);
                }
                log::warn!(
                    "Attempt {} of {} failed: {}; retrying in {}ms",
                    attempt,
                    policy.max_attempts,
                    err,
                    policy.delay.as_millis()
                );
                timer.sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
