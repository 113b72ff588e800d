//! telemetry - 可观测性库

pub use metrics_exporter_prometheus::PrometheusHandle;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// 初始化 tracing
///
/// `RUST_LOG` 优先于传入的日志级别。重复初始化时静默忽略。
pub fn init_tracing(log_level: &str) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// 初始化 JSON 格式的 tracing（生产环境）
pub fn init_tracing_json(log_level: &str) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(tracing_subscriber::fmt::layer().json())
        .try_init();
}

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// 初始化 Prometheus metrics
pub fn init_metrics() -> Result<PrometheusHandle, MetricsInitError> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsInitError(e.to_string()))
}

/// Prometheus recorder 安装失败
#[derive(Debug, Error)]
#[error("Failed to install Prometheus recorder: {0}")]
pub struct MetricsInitError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing("debug");
        init_tracing("info");
        tracing::info!("tracing initialized twice without panicking");
    }

    #[test]
    fn test_metrics_error_display() {
        let err = MetricsInitError("recorder already set".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to install Prometheus recorder: recorder already set"
        );
    }
}
