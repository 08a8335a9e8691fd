use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::api::ApiError;

/// Timeout and retry budget applied to every fetch kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    /// Extra attempts after the first; never more than one
    pub retries: u32,
}

impl RetryPolicy {
    pub const MAX_RETRIES: u32 = 1;

    pub fn new(timeout: Duration, retries: u32) -> Self {
        Self {
            timeout,
            retries: retries.min(Self::MAX_RETRIES),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), 1)
    }
}

/// Run `op` under the policy's timeout, retrying once on a retryable error.
/// A rate-limit reply waits for `Retry-After` (capped at the timeout) first.
pub async fn with_retry<T, F, Fut>(kind: &str, policy: RetryPolicy, mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let attempts = policy.retries.min(RetryPolicy::MAX_RETRIES) + 1;
    let mut last_error = ApiError::Timeout(policy.timeout.as_millis() as u64);

    for attempt in 1..=attempts {
        let error = match tokio::time::timeout(policy.timeout, op()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e,
            Err(_) => ApiError::Timeout(policy.timeout.as_millis() as u64),
        };

        if attempt == attempts || !error.is_retryable() {
            return Err(error);
        }

        warn!("{} attempt {}/{} failed: {}", kind, attempt, attempts, error);
        if let ApiError::RateLimited { retry_after: Some(secs) } = &error {
            let wait = Duration::from_secs(*secs).min(policy.timeout);
            debug!("{}: waiting {}ms before retry", kind, wait.as_millis());
            tokio::time::sleep(wait).await;
        }
        last_error = error;
    }

    Err(last_error)
}
