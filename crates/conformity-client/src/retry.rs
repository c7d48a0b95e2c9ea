//! Exponential backoff retry logic for API calls.

use crate::error::{ApiClientError, ApiResult};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (0 = no retries).
    pub max_retries: u32,
    /// Base delay in seconds for exponential backoff.
    pub base_delay_secs: u64,
    /// Maximum delay cap in seconds.
    pub max_delay_secs: u64,
    /// HTTP statuses that are treated as transient.
    pub retryable_statuses: BTreeSet<u16>,
}

fn default_retryable_statuses() -> BTreeSet<u16> {
    [429, 500, 501, 502, 503, 504].into_iter().collect()
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 9,
            base_delay_secs: 1,
            max_delay_secs: 60,
            retryable_statuses: default_retryable_statuses(),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy with the given max retries and base delay.
    /// The maximum delay cap defaults to 60 seconds and the retryable
    /// status set to 429 plus the 5xx family.
    #[must_use]
    pub fn new(max_retries: u32, base_delay_secs: u64) -> Self {
        Self {
            max_retries,
            base_delay_secs,
            max_delay_secs: 60,
            retryable_statuses: default_retryable_statuses(),
        }
    }

    /// Whether the error should be retried at the given attempt number.
    ///
    /// Transport-level failures (timeouts, unreachable endpoints) are always
    /// transient; HTTP errors are transient only when their status is in
    /// `retryable_statuses`.
    #[must_use]
    pub fn should_retry(&self, attempt: u32, error: &ApiClientError) -> bool {
        attempt < self.max_retries && self.is_transient(error)
    }

    /// Whether the error is transient at all, ignoring the attempt budget.
    #[must_use]
    pub fn is_transient(&self, error: &ApiClientError) -> bool {
        match error {
            ApiClientError::RateLimited { .. } => self.retryable_statuses.contains(&429),
            ApiClientError::ApiError { status, .. } => self.retryable_statuses.contains(status),
            ApiClientError::Timeout(_)
            | ApiClientError::Unreachable(_)
            | ApiClientError::Http(_) => true,
            _ => false,
        }
    }

    /// Calculate delay for the given attempt using exponential backoff.
    ///
    /// If the error is [`ApiClientError::RateLimited`] with a `retry_after_secs`
    /// value, that value is used directly (capped at `max_delay_secs`).
    /// Otherwise the delay is `min(base_delay_secs * 2^attempt, max_delay_secs)`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, error: &ApiClientError) -> Duration {
        let secs = if let ApiClientError::RateLimited {
            retry_after_secs: Some(retry_after),
        } = error
        {
            (*retry_after).min(self.max_delay_secs)
        } else {
            let exponential = self
                .base_delay_secs
                .saturating_mul(2u64.saturating_pow(attempt));
            exponential.min(self.max_delay_secs)
        };
        Duration::from_secs(secs)
    }

    /// Execute an async operation with retry.
    ///
    /// The closure `f` is called repeatedly until it succeeds, a non-retryable
    /// error is encountered, or the maximum number of retries is exhausted.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut f: F) -> ApiResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = ApiResult<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match f().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(
                            operation = operation_name,
                            attempt = attempt + 1,
                            "Operation succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(error) => {
                    // A non-transient error keeps its kind even on the last
                    // attempt, so callers can still match on it.
                    if !self.is_transient(&error) {
                        return Err(error);
                    }
                    if attempt >= self.max_retries {
                        warn!(
                            operation = operation_name,
                            attempts = attempt + 1,
                            error = %error,
                            "Max retries exceeded"
                        );
                        return Err(ApiClientError::MaxRetriesExceeded {
                            attempts: attempt + 1,
                            message: format!(
                                "{operation_name} failed after {} attempt(s): {error}",
                                attempt + 1
                            ),
                        });
                    }

                    let delay = self.delay_for(attempt, &error);
                    debug!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_secs = delay.as_secs(),
                        error = %error,
                        "Retrying after transient error"
                    );

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 9);
        assert_eq!(policy.base_delay_secs, 1);
        assert_eq!(policy.max_delay_secs, 60);
        assert!(policy.retryable_statuses.contains(&429));
        assert!(policy.retryable_statuses.contains(&503));
        assert!(!policy.retryable_statuses.contains(&404));
    }

    #[test]
    fn test_should_retry_rate_limited() {
        let policy = RetryPolicy::new(3, 1);
        let error = ApiClientError::RateLimited {
            retry_after_secs: None,
        };
        assert!(policy.should_retry(0, &error));
        assert!(policy.should_retry(2, &error));
        assert!(!policy.should_retry(3, &error)); // at max
    }

    #[test]
    fn test_should_retry_server_error() {
        let policy = RetryPolicy::new(3, 1);
        let error = ApiClientError::ApiError {
            status: 503,
            detail: "service unavailable".into(),
        };
        assert!(policy.should_retry(0, &error));
    }

    #[test]
    fn test_should_not_retry_client_error() {
        let policy = RetryPolicy::new(3, 1);

        let not_found = ApiClientError::NotFound("account".into());
        assert!(!policy.should_retry(0, &not_found));

        let api_400 = ApiClientError::ApiError {
            status: 400,
            detail: "bad request".into(),
        };
        assert!(!policy.should_retry(0, &api_400));

        let auth = ApiClientError::AuthError("invalid key".into());
        assert!(!policy.should_retry(0, &auth));
    }

    #[test]
    fn test_custom_retryable_statuses() {
        let mut policy = RetryPolicy::new(3, 1);
        policy.retryable_statuses = [503].into_iter().collect();

        let rate_limited = ApiClientError::RateLimited {
            retry_after_secs: None,
        };
        assert!(!policy.should_retry(0, &rate_limited)); // 429 not in set

        let e503 = ApiClientError::ApiError {
            status: 503,
            detail: "unavailable".into(),
        };
        assert!(policy.should_retry(0, &e503));
    }

    #[test]
    fn test_delay_exponential_backoff() {
        let policy = RetryPolicy::new(5, 1);
        let error = ApiClientError::Unreachable("host".into());

        assert_eq!(policy.delay_for(0, &error), Duration::from_secs(1)); // 1 * 2^0
        assert_eq!(policy.delay_for(1, &error), Duration::from_secs(2)); // 1 * 2^1
        assert_eq!(policy.delay_for(2, &error), Duration::from_secs(4)); // 1 * 2^2
        assert_eq!(policy.delay_for(3, &error), Duration::from_secs(8)); // 1 * 2^3
    }

    #[test]
    fn test_delay_capped_at_max() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_delay_secs: 1,
            max_delay_secs: 10,
            retryable_statuses: [429].into_iter().collect(),
        };
        let error = ApiClientError::Unreachable("host".into());

        assert_eq!(policy.delay_for(5, &error), Duration::from_secs(10)); // 32 capped
        assert_eq!(policy.delay_for(8, &error), Duration::from_secs(10)); // 256 capped
    }

    #[test]
    fn test_delay_rate_limited_with_retry_after() {
        let policy = RetryPolicy::new(5, 1);
        let error = ApiClientError::RateLimited {
            retry_after_secs: Some(30),
        };

        assert_eq!(policy.delay_for(0, &error), Duration::from_secs(30));
        assert_eq!(policy.delay_for(3, &error), Duration::from_secs(30));
    }

    #[test]
    fn test_delay_rate_limited_without_retry_after() {
        let policy = RetryPolicy::new(5, 2);
        let error = ApiClientError::RateLimited {
            retry_after_secs: None,
        };

        // Falls back to exponential: 2 * 2^1 = 4
        assert_eq!(policy.delay_for(1, &error), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_execute_succeeds_first_try() {
        let policy = RetryPolicy::new(3, 0);
        let result = policy
            .execute("test_op", || async { Ok::<_, ApiClientError>(42) })
            .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_execute_succeeds_after_retries() {
        let policy = RetryPolicy::new(3, 0);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = policy
            .execute("test_op", move || {
                let counter = counter_clone.clone();
                async move {
                    let attempt = counter.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err(ApiClientError::Unreachable("host".into()))
                    } else {
                        Ok(99)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 99);
        assert_eq!(counter.load(Ordering::SeqCst), 3); // initial + 2 retries
    }

    #[tokio::test]
    async fn test_execute_non_retryable_fails_immediately() {
        let policy = RetryPolicy::new(3, 0);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: ApiResult<()> = policy
            .execute("test_op", move || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ApiClientError::NotFound("account".into()))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1); // only one attempt
    }

    #[tokio::test]
    async fn test_non_retryable_error_on_last_attempt_keeps_its_kind() {
        let policy = RetryPolicy::new(3, 0);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        // Three transient failures, then a 404 on the final attempt.
        let result: ApiResult<()> = policy
            .execute("test_op", move || {
                let counter = counter_clone.clone();
                async move {
                    let attempt = counter.fetch_add(1, Ordering::SeqCst);
                    if attempt < 3 {
                        Err(ApiClientError::ApiError {
                            status: 503,
                            detail: "unavailable".into(),
                        })
                    } else {
                        Err(ApiClientError::NotFound("rule settings".into()))
                    }
                }
            })
            .await;

        match result {
            Err(ApiClientError::NotFound(_)) => {}
            other => panic!("Expected NotFound, got: {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_execute_max_retries_exceeded() {
        let policy = RetryPolicy::new(2, 0);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: ApiResult<()> = policy
            .execute("test_op", move || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ApiClientError::Unreachable("host".into()))
                }
            })
            .await;

        match result {
            Err(ApiClientError::MaxRetriesExceeded { attempts, .. }) => {
                assert_eq!(attempts, 3); // 1 initial + 2 retries
            }
            other => panic!("Expected MaxRetriesExceeded, got: {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_no_retries_policy() {
        let policy = RetryPolicy::new(0, 1);
        let error = ApiClientError::Unreachable("host".into());
        assert!(!policy.should_retry(0, &error));
    }
}
