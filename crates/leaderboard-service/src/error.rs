//! 排行榜服务错误类型
//!
//! 区分签名校验失败、负载解析失败、记录不存在、持久化失败和唯一约束冲突，
//! 由调用方据此决定是中止请求、视为无操作还是转为重试。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// PostgreSQL 唯一约束冲突的 SQLSTATE
const UNIQUE_VIOLATION: &str = "23505";

/// 排行榜服务错误类型
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("签名校验失败")]
    VerificationFailure,

    #[error("事件负载解析失败: {0}")]
    ParseFailure(#[from] serde_json::Error),

    #[error("记录未找到: {entity} id={id}")]
    NotFound { entity: &'static str, id: String },

    #[error("唯一约束冲突: {entity} {key}")]
    UniquenessConflict { entity: &'static str, key: String },

    #[error("数据库错误: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("存储结果通道在交付前被关闭")]
    ChannelClosed,

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 排行榜服务 Result 类型别名
pub type Result<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// 将插入语句的错误归类
    ///
    /// 唯一约束冲突单独归为可恢复的 `UniquenessConflict`，其余视为持久化失败
    pub fn from_insert(err: sqlx::Error, entity: &'static str, key: &str) -> Self {
        let is_unique_violation = err.as_database_error().is_some_and(|db_err| {
            db_err.is_unique_violation() || db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
        });

        if is_unique_violation {
            Self::UniquenessConflict {
                entity,
                key: key.to_string(),
            }
        } else {
            Self::Persistence(err)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_uniqueness_conflict(&self) -> bool {
        matches!(self, Self::UniquenessConflict { .. })
    }

    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::ChannelClosed)
    }

    /// 获取错误码（用于 API 响应与日志）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::VerificationFailure => "VERIFICATION_FAILURE",
            Self::ParseFailure(_) => "PARSE_FAILURE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::UniquenessConflict { .. } => "UNIQUENESS_CONFLICT",
            Self::Persistence(_) => "PERSISTENCE_FAILURE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ChannelClosed => "CHANNEL_CLOSED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::VerificationFailure => StatusCode::UNAUTHORIZED,
            Self::ParseFailure(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::UniquenessConflict { .. } => StatusCode::CONFLICT,
            Self::Persistence(_) | Self::ChannelClosed | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Persistence(e) => {
                tracing::error!(error = %e, "Database operation failed");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::ChannelClosed | Self::Internal(_) => {
                tracing::error!(error = %self, "Internal error");
                "服务内部错误，请稍后重试".to_string()
            }
            _ => self.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_retryable() {
        assert!(ServiceError::Persistence(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(ServiceError::ChannelClosed.is_retryable());
        assert!(!ServiceError::VerificationFailure.is_retryable());
        assert!(!ServiceError::not_found("label", 42).is_retryable());
    }

    #[test]
    fn test_from_insert_keeps_generic_errors_as_persistence() {
        let err = ServiceError::from_insert(sqlx::Error::PoolTimedOut, "leaderboard_entry", "alice");
        assert!(matches!(err, ServiceError::Persistence(_)));
        assert!(!err.is_uniqueness_conflict());
    }

    #[test]
    fn test_error_code() {
        assert_eq!(ServiceError::VerificationFailure.error_code(), "VERIFICATION_FAILURE");
        assert_eq!(ServiceError::not_found("label", 1).error_code(), "NOT_FOUND");
        assert_eq!(
            ServiceError::UniquenessConflict {
                entity: "leaderboard_entry",
                key: "alice".to_string()
            }
            .error_code(),
            "UNIQUENESS_CONFLICT"
        );
    }

    #[test]
    fn test_error_display() {
        let err = ServiceError::not_found("label", 42);
        assert!(err.to_string().contains("label"));
        assert!(err.to_string().contains("42"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServiceError::Validation("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::ChannelClosed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
