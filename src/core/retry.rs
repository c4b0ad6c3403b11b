//! Bounded, fixed-interval retry for remote reads.
//!
//! [`retry`] is the awaitable form. [`RetryTask`] runs the same loop on a
//! spawned task and cancels it when dropped, so a page that goes away never
//! receives a late result.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// How many times to try and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(4, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// `max_attempts` counts the first try. Zero is treated as one.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

/// Call `op` until it succeeds, fails with a non-retryable error, or the
/// policy runs out of attempts.
pub async fn retry<F, Fut, T>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Fetch succeeded after retrying");
                }
                return Ok(value);
            }
            Err(err) if !err.is_retryable() => {
                debug!(attempt, error = %err, "Non-retryable error");
                return Err(err);
            }
            Err(err) if attempt >= policy.max_attempts => {
                warn!(attempts = attempt, error = %err, "Giving up on fetch");
                return Err(Error::RetryExhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }
            Err(err) => {
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = policy.delay.as_millis() as u64,
                    error = %err,
                    "Fetch failed, retrying"
                );
                sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}

/// A retry loop running in the background.
///
/// Dropping the handle cancels the loop: a pending delay or an in-flight
/// attempt is abandoned and the sink is not called.
#[must_use = "dropping a RetryTask cancels it"]
pub struct RetryTask {
    _guard: DropGuard,
}

impl RetryTask {
    /// Spawn `op` under `policy` and hand the final result to `sink`.
    pub fn spawn<F, Fut, T, S>(policy: RetryPolicy, op: F, sink: S) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
        S: FnOnce(Result<T>) + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancelled.cancelled() => {
                    debug!("Retry task cancelled");
                }
                result = retry(&policy, op) => {
                    if !cancelled.is_cancelled() {
                        sink(result);
                    }
                }
            }
        });

        Self {
            _guard: token.drop_guard(),
        }
    }
}
