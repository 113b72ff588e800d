//! 服务启动

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use storefront_adapter_postgres::{PostgresConfig, check_connection, create_pool_with_retry};
use storefront_config::AppConfig;
use storefront_errors::{AppError, AppResult};
use storefront_telemetry::{PrometheusHandle, init_metrics, init_tracing, init_tracing_json};
use tracing::info;

use crate::infrastructure::persistence::{MergeStrategy, OrderRepositoryAdapter, PostgresOrderStore};

/// 加载服务配置
pub fn load_config(config_dir: &str) -> AppResult<AppConfig> {
    AppConfig::load(config_dir).map_err(|e| AppError::internal(e.to_string()))
}

/// 初始化服务运行时（tracing）
pub fn init_runtime(config: &AppConfig) {
    if config.is_production() || config.telemetry.json {
        init_tracing_json(&config.telemetry.log_level);
    } else {
        init_tracing(&config.telemetry.log_level);
    }

    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        "Runtime initialized"
    );
}

/// 安装 Prometheus recorder，订单 Repository 的操作计数从此开始导出
pub fn install_metrics() -> AppResult<PrometheusHandle> {
    let handle = init_metrics().map_err(|e| AppError::internal(e.to_string()))?;
    info!("Prometheus recorder installed");
    Ok(handle)
}

/// 由应用配置生成 PostgreSQL 连接配置
pub fn postgres_config(config: &AppConfig) -> PostgresConfig {
    PostgresConfig::new(config.database.url.expose_secret().as_str())
        .with_pool(config.database.min_connections, config.database.max_connections)
        .with_acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .with_application_name(config.app_name.as_str())
}

/// 建立连接池（带重试）并做一次连通性检查
pub async fn connect(config: &AppConfig) -> AppResult<PgPool> {
    let pool = create_pool_with_retry(&postgres_config(config)).await?;
    check_connection(&pool).await?;
    Ok(pool)
}

/// 组装基于 PostgreSQL 的订单 Repository（默认只增不删）
pub fn order_repository(pool: PgPool) -> OrderRepositoryAdapter<PostgresOrderStore> {
    OrderRepositoryAdapter::new(PostgresOrderStore::new(pool))
        .with_merge_strategy(MergeStrategy::Additive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;
    use storefront_config::{DatabaseConfig, TelemetryConfig};

    fn app_config() -> AppConfig {
        AppConfig {
            app_name: "checkout".to_string(),
            app_env: "test".to_string(),
            database: DatabaseConfig {
                url: Secret::new("postgres://localhost:5432/storefront".to_string()),
                max_connections: 8,
                min_connections: 2,
                acquire_timeout_secs: 3,
            },
            telemetry: TelemetryConfig::default(),
        }
    }

    #[test]
    fn test_postgres_config_from_app_config() {
        let pg = postgres_config(&app_config());

        assert_eq!(pg.pool_min, 2);
        assert_eq!(pg.pool_max, 8);
        assert_eq!(pg.acquire_timeout, Duration::from_secs(3));
        assert_eq!(
            pg.connection_url(),
            "postgres://localhost:5432/storefront?application_name=checkout"
        );
    }

    #[test]
    fn test_load_config_missing_database_url_is_internal_error() {
        let err = load_config("/nonexistent/checkout/config").unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_init_runtime_does_not_panic_when_called_twice() {
        let config = app_config();
        init_runtime(&config);
        init_runtime(&config);
    }
}
