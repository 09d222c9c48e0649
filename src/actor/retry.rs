//! Exponential backoff for background loads.

use std::future::Future;
use std::time::Duration;

use crate::constants::{LOAD_RETRY_INITIAL_MS, LOAD_RETRY_MAX_MS, LOAD_RETRIES};

/// How often and how patiently a failed load is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_delay: Duration,
    /// Upper bound for the doubled delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: LOAD_RETRIES,
            initial_delay: Duration::from_millis(LOAD_RETRY_INITIAL_MS),
            max_delay: Duration::from_millis(LOAD_RETRY_MAX_MS),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
        }
    }

    /// No retries: the first failure is final.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// Runs `operation` until it succeeds or `config.max_retries` retries have
/// failed, sleeping between attempts with a doubling, capped delay.
///
/// Returns the last error once retries are exhausted.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut failures = 0;
    let mut delay = config.initial_delay;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        failures += 1;
        if failures > config.max_retries {
            return Err(err);
        }

        tracing::warn!(
            "Load failed (attempt {}/{}): {}. Retrying in {:?}",
            failures,
            config.max_retries + 1,
            err,
            delay
        );
        tokio::time::sleep(delay).await;
        delay = (delay * 2).min(config.max_delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig::new(max_retries, Duration::from_millis(10), Duration::from_millis(40))
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<&str, String> = with_retry(&fast_config(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok("loaded") }
        })
        .await;

        assert_eq!(result, Ok("loaded"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry(&fast_config(3), || {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call <= 2 {
                    Err(format!("timeout #{call}"))
                } else {
                    Ok(call)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_with_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = with_retry(&fast_config(2), || {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err(format!("failure {call}")) }
        })
        .await;

        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_none_fails_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), &str> = with_retry(&RetryConfig::none(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("down") }
        })
        .await;

        assert_eq!(result, Err("down"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
