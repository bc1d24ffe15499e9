//! 日志与指标
//!
//! 进程启动时调用一次 [`init`]，返回的守卫需要保持到进程退出。

pub mod metrics;
pub mod middleware;
pub mod tracing;

use ::tracing::info;
use anyhow::Result;
use serde::Deserialize;

/// 可观测性配置，对应配置文件中的 `[observability]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// 写入日志和指标的服务名
    pub service_name: String,
    pub log_level: String,
    /// 生产环境输出 JSON，便于日志采集
    pub json_logs: bool,
    pub metrics_enabled: bool,
    pub metrics_port: u16,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: String::from("leaderboard-service"),
            log_level: String::from("info"),
            json_logs: false,
            metrics_enabled: false,
            metrics_port: 9090,
        }
    }
}

impl ObservabilityConfig {
    pub fn with_service_name(self, service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..self
        }
    }
}

/// 持有指标导出任务
#[must_use = "dropping the guard logs shutdown immediately"]
pub struct ObservabilityGuard {
    metrics: Option<metrics::MetricsExporter>,
}

impl ObservabilityGuard {
    pub fn metrics_enabled(&self) -> bool {
        self.metrics.is_some()
    }
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        info!(metrics = self.metrics.is_some(), "Observability shut down");
    }
}

/// 初始化日志，并按配置启动 Prometheus 导出
pub async fn init(config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    tracing::init(config)?;

    let metrics = if config.metrics_enabled {
        Some(metrics::init(config).await?)
    } else {
        None
    };

    info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        metrics_addr = ?metrics.as_ref().map(|m| m.addr),
        "Observability initialized"
    );

    Ok(ObservabilityGuard { metrics })
}
