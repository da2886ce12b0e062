use std::future::Future;

use tokio::time::{Duration, sleep};

use crate::error::{Result, SdkError};

/// Caller-driven retry of a whole operation (rebuild, re-sign, resubmit).
///
/// Transport failures raised before the send are retried. Sends that failed in
/// transit, expired or timed out are retried only when the operation is
/// idempotent, since the first attempt may have landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub retry_unknown_outcome: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    /// Single attempt
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(5),
            retry_unknown_outcome: false,
        }
    }

    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff: initial_backoff.saturating_mul(8),
            retry_unknown_outcome: true,
        }
    }

    /// Exponential backoff before attempt `attempt + 1`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    fn should_retry(&self, err: &SdkError, idempotent: bool) -> bool {
        err.is_transient() || (idempotent && self.retry_unknown_outcome && err.is_outcome_unknown())
    }

    /// Runs `op` with the attempt number (starting at 1) until it succeeds or must stop.
    pub async fn run<T, F, Fut>(&self, idempotent: bool, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts && self.should_retry(&err, idempotent) => {
                    let delay = self.backoff(attempt);
                    log::warn!(
                        "attempt {attempt}/{} failed: {err}. Retrying in {delay:?}...",
                        self.max_attempts
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
