//! Webhook 事件模型
//!
//! 只解析计分所需的字段：动作、PR 标识、合并状态、作者和标签名。
//! 其余字段（仓库、发送者等）全部忽略。

use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

/// 事件动作
///
/// 只有 closed / labeled / unlabeled 参与计分，其余动作原样保留后被忽略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventAction {
    Closed,
    Labeled,
    Unlabeled,
    Other(String),
}

impl From<String> for EventAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "closed" => Self::Closed,
            "labeled" => Self::Labeled,
            "unlabeled" => Self::Unlabeled,
            _ => Self::Other(value),
        }
    }
}

impl From<EventAction> for String {
    fn from(action: EventAction) -> Self {
        action.as_str().to_string()
    }
}

impl EventAction {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Closed => "closed",
            Self::Labeled => "labeled",
            Self::Unlabeled => "unlabeled",
            Self::Other(value) => value,
        }
    }
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventUser {
    #[serde(default)]
    pub id: i64,
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPullRequest {
    pub id: i64,
    /// 未合并的 PR 可能为 null
    #[serde(default)]
    pub merged: Option<bool>,
    pub user: EventUser,
}

impl EventPullRequest {
    pub fn is_merged(&self) -> bool {
        self.merged.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLabel {
    pub name: String,
}

/// Pull Request 生命周期通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub action: EventAction,
    pub pull_request: EventPullRequest,
    #[serde(default)]
    pub label: Option<EventLabel>,
}

impl WebhookEvent {
    /// 从原始请求体解析事件
    ///
    /// 缺失必需字段或 PR 标识为空值时返回 `ParseFailure`，
    /// 不会产生零值事件
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let event: Self = serde_json::from_slice(body)?;

        if event.pull_request.id <= 0 {
            return Err(ServiceError::ParseFailure(serde_json::Error::custom(
                format!("invalid pull_request.id: {}", event.pull_request.id),
            )));
        }
        if event.pull_request.user.login.is_empty() {
            return Err(ServiceError::ParseFailure(serde_json::Error::custom(
                "empty pull_request.user.login",
            )));
        }

        Ok(event)
    }

    pub fn pr_id(&self) -> i64 {
        self.pull_request.id
    }

    pub fn author(&self) -> &str {
        &self.pull_request.user.login
    }

    /// 标签名，不涉及标签的事件返回空串
    pub fn label_name(&self) -> &str {
        self.label.as_ref().map(|l| l.name.as_str()).unwrap_or("")
    }
}
