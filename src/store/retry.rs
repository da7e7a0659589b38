//! Bounded retry with exponential backoff.
//!
//! Used for opening database connections: each failed attempt is logged and
//! followed by a delay that doubles after every failure, until the attempt
//! budget is spent.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::config::DatabaseConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub attempts: u32,
    /// Delay after the first failure
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            initial_backoff,
        }
    }

    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(config.connect_attempts, config.initial_backoff())
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt - 1);
        self.initial_backoff.saturating_mul(factor)
    }
}

/// The last error seen once retries ran out (or a non-retryable error).
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub error: E,
}

/// Run `op` until it succeeds, fails with an error `retryable` rejects, or
/// the policy's attempt budget is spent.
pub async fn with_retries<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    mut op: F,
    retryable: R,
) -> Result<T, Exhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: Display,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Database connection established after retry");
                }
                return Ok(value);
            }
            Err(error) if attempt < policy.attempts && retryable(&error) => {
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts = policy.attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Database connection attempt failed"
                );
                tokio::time::sleep(delay).await;
            }
            Err(error) => {
                return Err(Exhausted {
                    attempts: attempt,
                    error,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(1))
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        assert_eq!(policy.backoff(4), Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_saturates() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1));
        assert!(policy.backoff(200) >= Duration::from_secs(1 << 31));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts, 1);
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<&str, Exhausted<String>> = with_retries(
            &fast(5),
            move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(format!("connection refused ({n})"))
                } else {
                    Ok("connected")
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(result.unwrap(), "connected");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), Exhausted<String>> = with_retries(
            &fast(4),
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("connection refused".to_string())
            },
            |_| true,
        )
        .await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 4);
        assert_eq!(exhausted.error, "connection refused");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_non_retryable_stops_immediately() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), Exhausted<String>> = with_retries(
            &fast(5),
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("bad connection string".to_string())
            },
            |_| false,
        )
        .await;

        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
