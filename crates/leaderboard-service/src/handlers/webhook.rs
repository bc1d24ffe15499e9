//! Webhook 投递处理器
//!
//! 无论结果如何都返回 200 和纯文本 `ok` / `fail`：非 2xx 响应会触发
//! 托管平台重投，而失败的投递重投也不会有不同结果。

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use leaderboard_shared::observability::metrics;
use tracing::{Instrument, error, info, instrument, warn};

use crate::error::{Result, ServiceError};
use crate::models::WebhookEvent;
use crate::service::Outcome;
use crate::state::AppState;
use crate::webhook::{SIGNATURE_HEADER, verify_signature};

pub const ACK_OK: &str = "ok";
pub const ACK_FAIL: &str = "fail";

/// 接收一次 Webhook 投递
///
/// POST /event
#[instrument(skip_all)]
pub async fn handle_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    // 在独立任务中处理，连接断开也不会中断加分与标签清理
    let delivery = tokio::spawn(
        async move { process_delivery(&state, &headers, body).await }.in_current_span(),
    );
    let result = delivery
        .await
        .unwrap_or_else(|e| Err(ServiceError::Internal(format!("delivery task failed: {e}"))));

    match result {
        Ok(outcome) => {
            metrics::record_webhook_delivery(outcome.as_str());
            info!(outcome = outcome.as_str(), "Webhook delivery handled");
            acknowledge(ACK_OK)
        }
        Err(e) => {
            let label = match &e {
                ServiceError::VerificationFailure => {
                    warn!("Invalid webhook signature");
                    "verification_failure"
                }
                ServiceError::ParseFailure(err) => {
                    warn!(error = %err, "Malformed webhook payload");
                    "parse_failure"
                }
                other => {
                    error!(error = %other, code = other.error_code(), "Webhook delivery failed");
                    "error"
                }
            };
            metrics::record_webhook_delivery(label);
            acknowledge(ACK_FAIL)
        }
    }
}

/// 校验签名、解析负载并交给分类器
///
/// 签名校验失败时不解析负载，也不访问存储
async fn process_delivery(
    state: &AppState,
    headers: &HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Outcome> {
    let body = body.map_err(|e| ServiceError::Internal(format!("unable to read body: {e}")))?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !verify_signature(&body, signature, state.webhook_secret.as_bytes()) {
        return Err(ServiceError::VerificationFailure);
    }

    let event = WebhookEvent::from_slice(&body)?;
    state.classifier.classify(&event).await
}

fn acknowledge(body: &'static str) -> Response {
    ([(header::CONTENT_TYPE, "text/plain")], body).into_response()
}
