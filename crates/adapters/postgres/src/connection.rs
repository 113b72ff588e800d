//! PostgreSQL 连接管理

use sqlx::postgres::{PgPool, PgPoolOptions};
use storefront_errors::{AppError, AppResult};
use tracing::info;

use crate::config::PostgresConfig;
use crate::retry::{is_sqlx_retryable, with_conditional_retry};

/// 创建连接池，对网络类错误按 `config.retry` 做指数退避重试
pub async fn create_pool_with_retry(config: &PostgresConfig) -> AppResult<PgPool> {
    let pool = with_conditional_retry(
        &config.retry,
        "PostgreSQL connection",
        || connect(config),
        is_sqlx_retryable,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to create pool: {}", e)))?;

    info!(
        max_connections = config.pool_max,
        "PostgreSQL connection pool created"
    );
    Ok(pool)
}

async fn connect(config: &PostgresConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.pool_max)
        .min_connections(config.pool_min)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(&config.connection_url())
        .await
}

/// 检查数据库连接
pub async fn check_connection(pool: &PgPool) -> AppResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Database health check failed: {}", e)))?;
    Ok(())
}
