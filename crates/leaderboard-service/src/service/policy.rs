//! 计分规则

use std::collections::HashSet;

use leaderboard_shared::config::LeaderboardConfig;

/// 计分规则
///
/// 启动时由配置构建，之后只读，通过 `Arc` 在请求间共享
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringPolicy {
    qualifying_label: String,
    exempt_users: HashSet<String>,
}

impl ScoringPolicy {
    pub fn new<I, S>(qualifying_label: impl Into<String>, exempt_users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            qualifying_label: qualifying_label.into(),
            exempt_users: exempt_users.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &LeaderboardConfig) -> Self {
        Self::new(
            config.qualifying_label.clone(),
            config.exempt_users.iter().cloned(),
        )
    }

    pub fn qualifying_label(&self) -> &str {
        &self.qualifying_label
    }

    /// 标签名是否为计分标签（精确匹配，大小写敏感）
    pub fn is_qualifying(&self, label_name: &str) -> bool {
        label_name == self.qualifying_label
    }

    pub fn is_exempt(&self, username: &str) -> bool {
        self.exempt_users.contains(username)
    }
}
