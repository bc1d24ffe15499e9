//! 排行榜仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::LeaderboardRepositoryTrait;
use crate::error::{Result, ServiceError};
use crate::models::Leaderboard;

pub struct LeaderboardRepository {
    pool: PgPool,
}

impl LeaderboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, leaderboard: &Leaderboard) -> Result<()> {
        sqlx::query("INSERT INTO leaderboards (id, name) VALUES ($1, $2)")
            .bind(&leaderboard.id)
            .bind(&leaderboard.name)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::from_insert(e, "leaderboard", &leaderboard.name))?;

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Leaderboard>> {
        let leaderboard =
            sqlx::query_as::<_, Leaderboard>("SELECT id, name FROM leaderboards WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(leaderboard)
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Leaderboard>> {
        let leaderboard =
            sqlx::query_as::<_, Leaderboard>("SELECT id, name FROM leaderboards WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(leaderboard)
    }
}

#[async_trait]
impl LeaderboardRepositoryTrait for LeaderboardRepository {
    async fn create(&self, leaderboard: &Leaderboard) -> Result<()> {
        self.create(leaderboard).await
    }

    async fn get(&self, id: &str) -> Result<Option<Leaderboard>> {
        self.get(id).await
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Leaderboard>> {
        self.get_by_name(name).await
    }
}
