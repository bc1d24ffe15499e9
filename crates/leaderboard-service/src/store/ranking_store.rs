//! 排行榜存储
//!
//! 组合三类仓储，对外暴露返回 [`StoreFuture`] 的操作。
//! 参数校验在调用线程完成，失败时不创建任务。

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{Instrument, debug, info, info_span};

use super::StoreFuture;
use crate::error::{Result, ServiceError};
use crate::models::{ID_LENGTH, Label, Leaderboard, LeaderboardEntry, Ranking};
use crate::repository::{
    EntryRepository, EntryRepositoryTrait, LabelRepository, LabelRepositoryTrait,
    LeaderboardRepository, LeaderboardRepositoryTrait, MemoryRankingRepository,
};

/// 排行榜存储
///
/// 克隆成本很低，所有克隆共享同一组仓储
#[derive(Clone)]
pub struct RankingStore {
    labels: Arc<dyn LabelRepositoryTrait>,
    entries: Arc<dyn EntryRepositoryTrait>,
    leaderboards: Arc<dyn LeaderboardRepositoryTrait>,
}

impl std::fmt::Debug for RankingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingStore").finish_non_exhaustive()
    }
}

impl RankingStore {
    pub fn new(
        labels: Arc<dyn LabelRepositoryTrait>,
        entries: Arc<dyn EntryRepositoryTrait>,
        leaderboards: Arc<dyn LeaderboardRepositoryTrait>,
    ) -> Self {
        Self {
            labels,
            entries,
            leaderboards,
        }
    }

    /// PostgreSQL 实现
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(
            Arc::new(LabelRepository::new(pool.clone())),
            Arc::new(EntryRepository::new(pool.clone())),
            Arc::new(LeaderboardRepository::new(pool)),
        )
    }

    /// 共享给定内存仓储的实现
    pub fn from_memory(repo: MemoryRankingRepository) -> Self {
        let repo = Arc::new(repo);
        Self::new(repo.clone(), repo.clone(), repo)
    }

    /// 全新的内存实现
    pub fn in_memory() -> Self {
        Self::from_memory(MemoryRankingRepository::new())
    }

    // ==================== 计分标签 ====================

    /// 记录 PR 带有计分标签
    ///
    /// 同一 PR 重复写入不报错。PR ID 为 0 视为无效输入。
    pub fn save_label(&self, pr_id: i64, name: &str) -> StoreFuture<()> {
        if pr_id == 0 {
            return StoreFuture::ready(Err(ServiceError::Validation(
                "label id must not be 0".to_string(),
            )));
        }

        let labels = self.labels.clone();
        let label = Label::new(pr_id, name);
        StoreFuture::spawn(
            async move { labels.save(&label).await }
                .instrument(info_span!("store.save_label", pr_id)),
        )
    }

    /// 不存在时返回 `NotFound`
    pub fn get_label(&self, pr_id: i64) -> StoreFuture<Label> {
        let labels = self.labels.clone();
        StoreFuture::spawn(
            async move { labels.get(pr_id).await }.instrument(info_span!("store.get_label", pr_id)),
        )
    }

    pub fn delete_label(&self, pr_id: i64) -> StoreFuture<()> {
        let labels = self.labels.clone();
        StoreFuture::spawn(
            async move { labels.delete(pr_id).await }
                .instrument(info_span!("store.delete_label", pr_id)),
        )
    }

    // ==================== 积分条目 ====================

    /// 为用户加一分，必要时先创建条目，返回新积分
    ///
    /// 总是先尝试创建条目，撞上用户名唯一约束说明条目已存在（或被并发
    /// 请求抢先创建），随后对该行做原子递增。不做先查后建。
    pub fn upsert_and_award(&self, leaderboard_id: &str, username: &str) -> StoreFuture<i64> {
        if leaderboard_id.len() != ID_LENGTH {
            return StoreFuture::ready(Err(ServiceError::Validation(format!(
                "leaderboard id must be {ID_LENGTH} characters, got {}",
                leaderboard_id.len()
            ))));
        }

        let entries = self.entries.clone();
        let leaderboard_id = leaderboard_id.to_string();
        let username = username.to_string();
        let span = info_span!("store.upsert_and_award", username = %username);

        StoreFuture::spawn(
            async move {
                let entry = LeaderboardEntry::new(&leaderboard_id, &username);
                match entries.create(&entry).await {
                    Ok(()) => debug!("Created leaderboard entry"),
                    Err(e) if e.is_uniqueness_conflict() => {
                        debug!("Entry exists, incrementing existing row");
                    }
                    Err(e) => return Err(e),
                }

                entries
                    .increment_points(&leaderboard_id, &username)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("leaderboard_entry", &username))
            }
            .instrument(span),
        )
    }

    pub fn get_entry(&self, username: &str) -> StoreFuture<LeaderboardEntry> {
        let entries = self.entries.clone();
        let username = username.to_string();
        StoreFuture::spawn(async move {
            entries
                .find_by_username(&username)
                .await?
                .ok_or_else(|| ServiceError::not_found("leaderboard_entry", &username))
        })
    }

    /// 按积分降序、用户名升序返回排名
    pub fn get_rankings(&self, leaderboard_id: &str) -> StoreFuture<Vec<Ranking>> {
        let entries = self.entries.clone();
        let leaderboard_id = leaderboard_id.to_string();
        StoreFuture::spawn(
            async move {
                let rankings = entries
                    .get_rankings(&leaderboard_id)
                    .await?
                    .into_iter()
                    .map(Ranking::from)
                    .collect();
                Ok(rankings)
            }
            .instrument(info_span!("store.get_rankings")),
        )
    }

    // ==================== 排行榜 ====================

    /// 保存新排行榜并生成 ID
    ///
    /// 已带 ID 的排行榜视为已存在，拒绝保存
    pub fn save_leaderboard(&self, leaderboard: Leaderboard) -> StoreFuture<Leaderboard> {
        if leaderboard.is_persisted() {
            return StoreFuture::ready(Err(ServiceError::Validation(format!(
                "leaderboard {} already has an id",
                leaderboard.id
            ))));
        }

        let leaderboards = self.leaderboards.clone();
        StoreFuture::spawn(async move { insert_leaderboard(&*leaderboards, leaderboard).await })
    }

    pub fn get_leaderboard(&self, id: &str) -> StoreFuture<Leaderboard> {
        let leaderboards = self.leaderboards.clone();
        let id = id.to_string();
        StoreFuture::spawn(async move {
            leaderboards
                .get(&id)
                .await?
                .ok_or_else(|| ServiceError::not_found("leaderboard", &id))
        })
    }

    /// 按名称查找排行榜，不存在时创建
    ///
    /// 多个实例同时启动时，创建失败的一方重新按名称读取
    pub fn get_or_create_leaderboard(&self, name: &str) -> StoreFuture<Leaderboard> {
        let leaderboards = self.leaderboards.clone();
        let name = name.to_string();
        let span = info_span!("store.get_or_create_leaderboard", name = %name);
        StoreFuture::spawn(
            async move {
                if let Some(existing) = leaderboards.get_by_name(&name).await? {
                    return Ok(existing);
                }

                match insert_leaderboard(&*leaderboards, Leaderboard::new(&name)).await {
                    Ok(created) => {
                        info!(leaderboard_id = %created.id, "Leaderboard created");
                        Ok(created)
                    }
                    Err(e) if e.is_uniqueness_conflict() => leaderboards
                        .get_by_name(&name)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("leaderboard", &name)),
                    Err(e) => Err(e),
                }
            }
            .instrument(span),
        )
    }
}

async fn insert_leaderboard(
    repo: &dyn LeaderboardRepositoryTrait,
    mut leaderboard: Leaderboard,
) -> Result<Leaderboard> {
    leaderboard.pre_save();
    repo.create(&leaderboard).await?;
    Ok(leaderboard)
}
