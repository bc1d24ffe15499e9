//! 贡献者排行榜服务
//!
//! 接收代码托管平台的 Pull Request Webhook，把带计分标签并已合并的 PR
//! 折算为作者积分，并提供排名页面。
//!
//! ## 处理流程
//!
//! 请求体 → 签名校验 → 事件解析 → 事件分类 → 排行榜存储 → `ok` / `fail`
//!
//! ## 模块结构
//!
//! - `webhook`: HMAC-SHA1 签名校验
//! - `models`: 事件、标签、积分条目、排行榜
//! - `repository`: PostgreSQL 与内存仓储
//! - `store`: 返回一次性结果句柄的存储门面
//! - `service`: 计分规则与事件分类器
//! - `handlers` / `routes` / `render`: HTTP 接口与排名页面
//!
//! ## 并发约定
//!
//! 存储层不加锁。重复投递依靠标签记录的主键 upsert 与加分后删除标签
//! 保持幂等；同一新用户的并发首次加分依靠用户名唯一约束和原子递增
//! 保证只有一条记录且不丢失积分。

pub mod error;
pub mod handlers;
pub mod models;
pub mod render;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;
pub mod webhook;

pub use error::{Result, ServiceError};
pub use models::{Label, Leaderboard, LeaderboardEntry, Ranking, WebhookEvent};
pub use service::{EventClassifier, IgnoreReason, Outcome, ScoringPolicy};
pub use state::AppState;
pub use store::{RankingStore, StoreFuture};

/// 嵌入的数据库迁移
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
