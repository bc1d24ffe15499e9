//! 应用状态定义

use std::sync::Arc;

use leaderboard_shared::database::Database;

use crate::models::Leaderboard;
use crate::service::EventClassifier;
use crate::store::RankingStore;

/// Axum 应用共享状态
///
/// 全部字段在启动时确定，之后只读
#[derive(Clone)]
pub struct AppState {
    pub store: RankingStore,
    pub classifier: Arc<EventClassifier>,
    /// 本实例服务的唯一排行榜
    pub leaderboard: Arc<Leaderboard>,
    pub webhook_secret: Arc<str>,
    /// 就绪探针使用；内存存储下为空
    pub db: Option<Database>,
}

impl AppState {
    pub fn new(
        store: RankingStore,
        classifier: EventClassifier,
        leaderboard: Leaderboard,
        webhook_secret: &str,
    ) -> Self {
        Self {
            store,
            classifier: Arc::new(classifier),
            leaderboard: Arc::new(leaderboard),
            webhook_secret: Arc::from(webhook_secret),
            db: None,
        }
    }

    pub fn with_database(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }
}
