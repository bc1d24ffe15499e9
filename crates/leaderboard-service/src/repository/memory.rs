//! 内存仓储
//!
//! 基于 DashMap 的三类仓储实现，语义与 PostgreSQL 版本一致：
//! 用户名和排行榜名称唯一，积分在分片写锁内原子递增。
//! 适用于测试和本地开发。

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::traits::{EntryRepositoryTrait, LabelRepositoryTrait, LeaderboardRepositoryTrait};
use crate::error::{Result, ServiceError};
use crate::models::{Label, Leaderboard, LeaderboardEntry, ranking_order};

/// 内存仓储
///
/// 克隆后共享同一份数据
#[derive(Debug, Clone, Default)]
pub struct MemoryRankingRepository {
    labels: Arc<DashMap<i64, Label>>,
    entries: Arc<DashMap<String, LeaderboardEntry>>,
    /// 以名称为键，保证名称唯一
    leaderboards: Arc<DashMap<String, Leaderboard>>,
}

impl MemoryRankingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl LabelRepositoryTrait for MemoryRankingRepository {
    async fn save(&self, label: &Label) -> Result<()> {
        self.labels.insert(label.id, label.clone());
        Ok(())
    }

    async fn get(&self, pr_id: i64) -> Result<Label> {
        self.labels
            .get(&pr_id)
            .map(|l| l.clone())
            .ok_or_else(|| ServiceError::not_found("label", pr_id))
    }

    async fn delete(&self, pr_id: i64) -> Result<()> {
        self.labels.remove(&pr_id);
        Ok(())
    }
}

#[async_trait]
impl EntryRepositoryTrait for MemoryRankingRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<LeaderboardEntry>> {
        Ok(self.entries.get(username).map(|e| e.clone()))
    }

    async fn create(&self, entry: &LeaderboardEntry) -> Result<()> {
        match self.entries.entry(entry.username.clone()) {
            Entry::Occupied(_) => Err(ServiceError::UniquenessConflict {
                entity: "leaderboard_entry",
                key: entry.username.clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(entry.clone());
                Ok(())
            }
        }
    }

    async fn increment_points(&self, leaderboard_id: &str, username: &str) -> Result<Option<i64>> {
        let Some(mut entry) = self.entries.get_mut(username) else {
            return Ok(None);
        };
        if entry.leaderboard_id != leaderboard_id {
            return Ok(None);
        }

        entry.points += 1;
        Ok(Some(entry.points))
    }

    async fn get_rankings(&self, leaderboard_id: &str) -> Result<Vec<LeaderboardEntry>> {
        let mut entries: Vec<LeaderboardEntry> = self
            .entries
            .iter()
            .filter(|e| e.leaderboard_id == leaderboard_id)
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by(ranking_order);

        Ok(entries)
    }
}

#[async_trait]
impl LeaderboardRepositoryTrait for MemoryRankingRepository {
    async fn create(&self, leaderboard: &Leaderboard) -> Result<()> {
        match self.leaderboards.entry(leaderboard.name.clone()) {
            Entry::Occupied(_) => Err(ServiceError::UniquenessConflict {
                entity: "leaderboard",
                key: leaderboard.name.clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(leaderboard.clone());
                Ok(())
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Leaderboard>> {
        Ok(self
            .leaderboards
            .iter()
            .find(|l| l.id == id)
            .map(|l| l.value().clone()))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Leaderboard>> {
        Ok(self.leaderboards.get(name).map(|l| l.clone()))
    }
}
