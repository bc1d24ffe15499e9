//! Prometheus 指标
//!
//! recorder 全局只安装一次；`/metrics` 与 `/health` 在独立端口上暴露。
//! 未安装 recorder 时所有 `record_*` 都是空操作。

use std::net::SocketAddr;
use std::sync::OnceLock;

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::ObservabilityConfig;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const WEBHOOK_DELIVERIES_TOTAL: &str = "webhook_deliveries_total";
pub const POINTS_AWARDED_TOTAL: &str = "points_awarded_total";
pub const LABELS_RECORDED_TOTAL: &str = "labels_recorded_total";
pub const LABEL_CLEANUP_FAILURES_TOTAL: &str = "label_cleanup_failures_total";

const COUNTERS: &[(&str, &str)] = &[
    (HTTP_REQUESTS_TOTAL, "HTTP requests by method, route and status"),
    (WEBHOOK_DELIVERIES_TOTAL, "Webhook deliveries by outcome"),
    (POINTS_AWARDED_TOTAL, "Points awarded to contributors"),
    (LABELS_RECORDED_TOTAL, "Qualifying labels recorded or removed"),
    (
        LABEL_CLEANUP_FAILURES_TOTAL,
        "Post-award label deletions that failed after retries",
    ),
];

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// 指标导出服务，drop 时不会停止后台任务
pub struct MetricsExporter {
    pub addr: SocketAddr,
    _server: JoinHandle<()>,
}

/// 安装 recorder 并启动 `/metrics` 导出端口
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsExporter> {
    let handle = match PROMETHEUS_HANDLE.get() {
        Some(handle) => handle.clone(),
        None => {
            let handle = PrometheusBuilder::new()
                .add_global_label("service", config.service_name.clone())
                .install_recorder()?;
            describe();
            PROMETHEUS_HANDLE.get_or_init(|| handle).clone()
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let listener = TcpListener::bind(addr).await?;
    let router = Router::new()
        .route("/metrics", get(move || async move { handle.render() }))
        .route("/health", get(|| async { "OK" }));

    info!(%addr, "Metrics exporter listening");
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!(error = %e, "Metrics exporter stopped");
        }
    });

    Ok(MetricsExporter {
        addr,
        _server: server,
    })
}

fn describe() {
    for (name, help) in COUNTERS {
        metrics::describe_counter!(*name, *help);
    }
    metrics::describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "HTTP request latency"
    );
}

/// 当前进程的指标快照，未初始化时为 `None`
pub fn render() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(PrometheusHandle::render)
}

pub fn record_http_request(method: &str, route: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_owned()),
        ("route", route.to_owned()),
        ("status", status.to_string()),
    ];
    metrics::counter!(HTTP_REQUESTS_TOTAL, &labels).increment(1);
    metrics::histogram!(HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// `outcome` 为投递结果，如 `awarded`、`ignored`、`verification_failure`
pub fn record_webhook_delivery(outcome: &'static str) {
    metrics::counter!(WEBHOOK_DELIVERIES_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_points_awarded(points: u64) {
    metrics::counter!(POINTS_AWARDED_TOTAL).increment(points);
}

/// `change` 为 `recorded` 或 `removed`
pub fn record_label_change(change: &'static str) {
    metrics::counter!(LABELS_RECORDED_TOTAL, "change" => change).increment(1);
}

pub fn record_label_cleanup_failure() {
    metrics::counter!(LABEL_CLEANUP_FAILURES_TOTAL).increment(1);
}
