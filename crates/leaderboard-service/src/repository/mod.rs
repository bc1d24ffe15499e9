//! 数据库仓储层
//!
//! 三类记录（计分标签、积分条目、排行榜）各有一个仓储接口，
//! 分别提供 PostgreSQL 实现和基于 DashMap 的内存实现。
//!
//! 仓储只负责持久化，不包含计分逻辑；唯一约束冲突以
//! `UniquenessConflict` 返回，由上层决定如何处理。

mod entry_repo;
mod label_repo;
mod leaderboard_repo;
mod memory;
mod traits;

pub use entry_repo::EntryRepository;
pub use label_repo::LabelRepository;
pub use leaderboard_repo::LeaderboardRepository;
pub use memory::MemoryRankingRepository;
pub use traits::*;
