//! 排行榜存储门面
//!
//! 每个存储操作都作为独立任务执行，通过 [`StoreFuture`] 交付唯一一次结果。
//! 存储层不加锁，并发正确性依赖原子递增和用户名唯一约束。

mod future;
mod ranking_store;

pub use future::StoreFuture;
pub use ranking_store::RankingStore;
