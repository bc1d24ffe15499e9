//! 排行榜积分条目

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// 贡献者积分条目
///
/// 每个用户名一条，首次计分时创建，积分只增不减
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub leaderboard_id: String,
    /// 用户名（全局唯一，大小写敏感）
    pub username: String,
    pub points: i64,
}

impl LeaderboardEntry {
    /// 创建零积分条目
    pub fn new(leaderboard_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            leaderboard_id: leaderboard_id.into(),
            username: username.into(),
            points: 0,
        }
    }
}

/// 排名展示项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    pub username: String,
    pub points: i64,
}

impl From<LeaderboardEntry> for Ranking {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            username: entry.username,
            points: entry.points,
        }
    }
}

/// 排名顺序：积分降序，积分相同按用户名升序
pub fn ranking_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| a.username.cmp(&b.username))
}
