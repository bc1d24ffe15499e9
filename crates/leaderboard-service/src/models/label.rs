//! 计分标签记录

use serde::{Deserialize, Serialize};

/// 计分标签
///
/// 表示某个 PR 当前带有计分标签且尚未因合并而计分，以 PR ID 为主键
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Label {
    /// PR 的外部数字 ID
    pub id: i64,
    pub name: String,
}

impl Label {
    pub fn new(pr_id: i64, name: impl Into<String>) -> Self {
        Self {
            id: pr_id,
            name: name.into(),
        }
    }
}
