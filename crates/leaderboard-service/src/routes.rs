//! 路由配置

use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use leaderboard_shared::observability::middleware as obs_middleware;
use tower_http::timeout::TimeoutLayer;

use crate::{handlers, state::AppState};

/// 构建完整路由
///
/// `request_timeout` 只作用于只读路由。`/event` 不设超时：投递一旦开始
/// 处理就必须完整执行并回复 `ok` / `fail`
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    let reads = Router::new()
        .route("/", get(handlers::rankings::rankings_page))
        .route("/api/rankings", get(handlers::rankings::list_rankings))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ));

    Router::new()
        .route("/event", post(handlers::webhook::handle_event))
        .merge(reads)
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
