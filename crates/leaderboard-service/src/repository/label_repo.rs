//! 计分标签仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::LabelRepositoryTrait;
use crate::error::{Result, ServiceError};
use crate::models::Label;

pub struct LabelRepository {
    pool: PgPool,
}

impl LabelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 写入标签
    ///
    /// 以 PR ID 为主键做 upsert，重复投递的 labeled 事件只会留下一行
    pub async fn save(&self, label: &Label) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO labels (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
            "#,
        )
        .bind(label.id)
        .bind(&label.name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, pr_id: i64) -> Result<Label> {
        sqlx::query_as::<_, Label>("SELECT id, name FROM labels WHERE id = $1")
            .bind(pr_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("label", pr_id))
    }

    pub async fn delete(&self, pr_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM labels WHERE id = $1")
            .bind(pr_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl LabelRepositoryTrait for LabelRepository {
    async fn save(&self, label: &Label) -> Result<()> {
        self.save(label).await
    }

    async fn get(&self, pr_id: i64) -> Result<Label> {
        self.get(pr_id).await
    }

    async fn delete(&self, pr_id: i64) -> Result<()> {
        self.delete(pr_id).await
    }
}
