//! Fixed-delay retry on HTTP 429.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::SireneError;
use crate::transport::ApiResponse;

/// Retry policy for rate-limited requests.
///
/// Only `429 Too Many Requests` is retried; every other status, and every
/// transport error, ends the attempt loop immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRetry {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Wait after each rate-limited attempt but the last
    pub delay: Duration,
}

impl RateLimitRetry {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `operation` until it returns something other than a 429.
    ///
    /// Fails with [`SireneError::RateLimitExceeded`] once every attempt was
    /// rate limited.
    pub async fn run<F, Fut>(&self, mut operation: F) -> Result<ApiResponse, SireneError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<ApiResponse, SireneError>>,
    {
        for attempt in 1..=self.max_attempts {
            let response = operation().await?;
            if !response.is_rate_limited() {
                if attempt > 1 {
                    tracing::info!(
                        "Request succeeded on attempt {} after {} rate-limited responses",
                        attempt,
                        attempt - 1
                    );
                }
                return Ok(response);
            }

            if attempt < self.max_attempts {
                tracing::warn!(
                    "Rate limited (429) on attempt {}/{}, retrying in {:?}",
                    attempt,
                    self.max_attempts,
                    self.delay
                );
                sleep(self.delay).await;
            }
        }

        tracing::warn!(
            "Giving up after {} rate-limited attempts",
            self.max_attempts
        );
        Err(SireneError::RateLimitExceeded {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn quick(attempts: u32) -> RateLimitRetry {
        RateLimitRetry::new(attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_retry_success_first_try() {
        let call_count = Rc::new(RefCell::new(0));

        let result = {
            let call_count = call_count.clone();
            quick(5).run(move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    Ok(ApiResponse::ok_json("{}"))
                }
            })
        }
        .await;

        assert!(result.unwrap().is_success());
        assert_eq!(*call_count.borrow(), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_rate_limits() {
        let call_count = Rc::new(RefCell::new(0));

        let result = {
            let call_count = call_count.clone();
            quick(5).run(move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    if *call_count.borrow() < 3 {
                        Ok(ApiResponse::new(StatusCode::TOO_MANY_REQUESTS, ""))
                    } else {
                        Ok(ApiResponse::ok_json("{}"))
                    }
                }
            })
        }
        .await;

        assert!(result.unwrap().is_success());
        assert_eq!(*call_count.borrow(), 3);
    }

    #[tokio::test]
    async fn test_retry_exhausted() {
        let call_count = Rc::new(RefCell::new(0));

        let result = {
            let call_count = call_count.clone();
            quick(4).run(move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    Ok(ApiResponse::new(StatusCode::TOO_MANY_REQUESTS, ""))
                }
            })
        }
        .await;

        assert!(matches!(
            result,
            Err(SireneError::RateLimitExceeded { attempts: 4 })
        ));
        assert_eq!(*call_count.borrow(), 4);
    }

    #[tokio::test]
    async fn test_other_statuses_are_not_retried() {
        let call_count = Rc::new(RefCell::new(0));

        let result = {
            let call_count = call_count.clone();
            quick(5).run(move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    Ok(ApiResponse::new(StatusCode::SERVICE_UNAVAILABLE, "down"))
                }
            })
        }
        .await;

        assert_eq!(result.unwrap().status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(*call_count.borrow(), 1);
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let result = quick(5)
            .run(|| async { Err(SireneError::Network("timed out".to_string())) })
            .await;
        assert!(matches!(result, Err(SireneError::Network(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_rate_limited_attempts() {
        let policy = RateLimitRetry::new(3, Duration::from_secs(1));
        let start = tokio::time::Instant::now();

        let result = policy
            .run(|| async { Ok(ApiResponse::new(StatusCode::TOO_MANY_REQUESTS, "")) })
            .await;

        assert!(matches!(
            result,
            Err(SireneError::RateLimitExceeded { attempts: 3 })
        ));
        // Two waits: none after the final attempt
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2), "waited {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(3), "waited {:?}", elapsed);
    }

    #[test]
    fn test_zero_attempts_means_one() {
        assert_eq!(RateLimitRetry::new(0, Duration::ZERO).max_attempts, 1);
    }
}
