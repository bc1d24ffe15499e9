//! HTTP 中间件

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, info_span};

use super::metrics;

/// 请求 ID 所在的 header
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// GitHub 为每次 Webhook 投递生成的唯一 ID
pub const DELIVERY_ID_HEADER: &str = "x-github-delivery";

/// 未命中任何路由时使用的 path 标签
const UNMATCHED_PATH: &str = "unmatched";

/// 请求追踪与 HTTP 指标
///
/// 指标按路由模板打标签，避免任意路径造成标签爆炸
pub async fn http_tracing(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_PATH.to_owned());

    let span = info_span!(
        "http_request",
        %method,
        route = %route,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    );

    let started = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;
    let elapsed = started.elapsed();

    let status = response.status().as_u16();
    span.record("status", status);
    span.record("latency_ms", elapsed.as_millis() as u64);

    metrics::record_http_request(method.as_str(), &route, status, elapsed.as_secs_f64());

    response
}

/// 请求 ID 中间件
///
/// 依次取 `x-request-id`、`x-github-delivery`，都没有时生成 UUID；
/// 结果写入请求扩展并回显在响应头中
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let id = RequestId::from_headers(request.headers());
    request.extensions_mut().insert(id.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// 请求 ID
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        [REQUEST_ID_HEADER, DELIVERY_ID_HEADER]
            .iter()
            .filter_map(|name| headers.get(*name))
            .filter_map(|v| v.to_str().ok())
            .find(|v| !v.is_empty())
            .map(|v| Self(v.to_owned()))
            .unwrap_or_else(|| Self(uuid::Uuid::new_v4().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
