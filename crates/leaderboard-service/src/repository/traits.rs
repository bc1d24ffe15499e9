//! 仓储 Trait 定义
//!
//! 存储门面依赖这些抽象而非具体实现，便于替换为内存实现或 mock

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Label, Leaderboard, LeaderboardEntry};

/// 计分标签仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LabelRepositoryTrait: Send + Sync {
    /// 按 PR ID 写入标签，已存在时覆盖名称，不视为错误
    async fn save(&self, label: &Label) -> Result<()>;

    /// 不存在时返回 `NotFound`
    async fn get(&self, pr_id: i64) -> Result<Label>;

    /// 删除不存在的记录不是错误
    async fn delete(&self, pr_id: i64) -> Result<()>;
}

/// 积分条目仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntryRepositoryTrait: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<LeaderboardEntry>>;

    /// 用户名已存在时返回 `UniquenessConflict`
    async fn create(&self, entry: &LeaderboardEntry) -> Result<()>;

    /// 原子地把积分加一，返回新积分；条目不存在时返回 `None`
    async fn increment_points(&self, leaderboard_id: &str, username: &str) -> Result<Option<i64>>;

    /// 按积分降序、用户名升序返回全部条目
    async fn get_rankings(&self, leaderboard_id: &str) -> Result<Vec<LeaderboardEntry>>;
}

/// 排行榜仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaderboardRepositoryTrait: Send + Sync {
    /// 名称已存在时返回 `UniquenessConflict`
    async fn create(&self, leaderboard: &Leaderboard) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<Leaderboard>>;

    async fn get_by_name(&self, name: &str) -> Result<Option<Leaderboard>>;
}
