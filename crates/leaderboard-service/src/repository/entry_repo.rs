//! 积分条目仓储
//!
//! 积分只通过单条 `points = points + 1` 语句变更，不在调用方做读-改-写

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::EntryRepositoryTrait;
use crate::error::{Result, ServiceError};
use crate::models::LeaderboardEntry;

pub struct EntryRepository {
    pool: PgPool,
}

impl EntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<LeaderboardEntry>> {
        let entry = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT leaderboard_id, username, points
            FROM leaderboard_entries
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// 创建条目
    ///
    /// 用户名唯一约束冲突映射为 `UniquenessConflict`
    pub async fn create(&self, entry: &LeaderboardEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO leaderboard_entries (leaderboard_id, username, points)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&entry.leaderboard_id)
        .bind(&entry.username)
        .bind(entry.points)
        .execute(&self.pool)
        .await
        .map_err(|e| ServiceError::from_insert(e, "leaderboard_entry", &entry.username))?;

        Ok(())
    }

    pub async fn increment_points(
        &self,
        leaderboard_id: &str,
        username: &str,
    ) -> Result<Option<i64>> {
        let points = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE leaderboard_entries
            SET points = points + 1
            WHERE username = $1 AND leaderboard_id = $2
            RETURNING points
            "#,
        )
        .bind(username)
        .bind(leaderboard_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(points)
    }

    pub async fn get_rankings(&self, leaderboard_id: &str) -> Result<Vec<LeaderboardEntry>> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT leaderboard_id, username, points
            FROM leaderboard_entries
            WHERE leaderboard_id = $1
            ORDER BY points DESC, username COLLATE "C" ASC
            "#,
        )
        .bind(leaderboard_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

#[async_trait]
impl EntryRepositoryTrait for EntryRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<LeaderboardEntry>> {
        self.find_by_username(username).await
    }

    async fn create(&self, entry: &LeaderboardEntry) -> Result<()> {
        self.create(entry).await
    }

    async fn increment_points(&self, leaderboard_id: &str, username: &str) -> Result<Option<i64>> {
        self.increment_points(leaderboard_id, username).await
    }

    async fn get_rankings(&self, leaderboard_id: &str) -> Result<Vec<LeaderboardEntry>> {
        self.get_rankings(leaderboard_id).await
    }
}
