//! 重试机制模块
//!
//! 提供带指数退避的重试逻辑。仅用于建立连接，仓储操作的错误原样返回。

use std::future::Future;

use tracing::{info, warn};

use crate::config::RetryConfig;

/// 判断错误信息是否属于可重试的瞬时故障
pub fn is_retryable_error(error: &str) -> bool {
    let retryable_patterns = [
        "connection refused",
        "connection reset",
        "connection timed out",
        "timeout",
        "temporarily unavailable",
        "too many connections",
        "econnrefused",
        "etimedout",
        "econnreset",
        "broken pipe",
        "connection closed",
        "could not connect",
        "no route to host",
        "the database system is starting up",
    ];

    let error_lower = error.to_lowercase();
    retryable_patterns
        .iter()
        .any(|pattern| error_lower.contains(pattern))
}

/// 判断 sqlx 错误是否可重试
pub fn is_sqlx_retryable(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Io(_) => true,
        sqlx::Error::Tls(_) => true,
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::PoolClosed => false,
        sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => {
            // 57P03: cannot_connect_now
            // 08000/08003/08006: connection_exception 系列
            match db_err.code() {
                Some(code) => matches!(code.as_ref(), "57P03" | "08000" | "08003" | "08006"),
                None => is_retryable_error(db_err.message()),
            }
        }
        _ => is_retryable_error(&error.to_string()),
    }
}

/// 带条件重试的异步操作执行器
pub async fn with_conditional_retry<F, Fut, T, E, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    info!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        "PostgreSQL operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                let is_last_attempt = attempt + 1 >= config.max_attempts;

                if !should_retry(&e) {
                    warn!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        error = %e,
                        "PostgreSQL operation failed with non-retryable error"
                    );
                    return Err(e);
                }

                if is_last_attempt {
                    warn!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        max_attempts = config.max_attempts,
                        error = %e,
                        "PostgreSQL operation failed, no more retries"
                    );
                    return Err(e);
                }

                let delay = config.delay_for_attempt(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    max_attempts = config.max_attempts,
                    error = %e,
                    delay_ms = delay.as_millis(),
                    "PostgreSQL operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast_retry(max_attempts: u32) -> RetryConfig {
        RetryConfig::new(max_attempts, Duration::from_millis(1), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_retry_success_first_attempt() {
        let counter = AtomicU32::new(0);
        let result: Result<i32, &str> = with_conditional_retry(
            &fast_retry(3),
            "test",
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(42) }
            },
            |_| true,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let counter = AtomicU32::new(0);

        let result: Result<i32, &str> = with_conditional_retry(
            &fast_retry(5),
            "test",
            || {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if count < 2 {
                        Err("connection refused")
                    } else {
                        Ok(42)
                    }
                }
            },
            |e| is_retryable_error(e),
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);

        let result: Result<i32, &str> = with_conditional_retry(
            &fast_retry(3),
            "test",
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err("connection reset by peer") }
            },
            |e| is_retryable_error(e),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_fails_fast() {
        let counter = AtomicU32::new(0);

        let result: Result<i32, &str> = with_conditional_retry(
            &fast_retry(5),
            "test",
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err("password authentication failed") }
            },
            |e| is_retryable_error(e),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_is_retryable_error() {
        assert!(is_retryable_error("connection refused"));
        assert!(is_retryable_error("Connection timed out"));
        assert!(is_retryable_error("econnrefused"));
        assert!(is_retryable_error("broken pipe"));
        assert!(is_retryable_error("FATAL: the database system is starting up"));
        assert!(!is_retryable_error("unique constraint violation"));
        assert!(!is_retryable_error("foreign key violation"));
    }

    #[test]
    fn test_sqlx_pool_errors() {
        assert!(is_sqlx_retryable(&sqlx::Error::PoolTimedOut));
        assert!(!is_sqlx_retryable(&sqlx::Error::PoolClosed));
        assert!(!is_sqlx_retryable(&sqlx::Error::RowNotFound));
    }
}
