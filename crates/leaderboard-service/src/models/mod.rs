//! 领域模型定义

mod entry;
mod event;
mod label;
mod leaderboard;

pub use entry::{LeaderboardEntry, Ranking, ranking_order};
pub use event::{EventAction, EventLabel, EventPullRequest, EventUser, WebhookEvent};
pub use label::Label;
pub use leaderboard::{ID_LENGTH, Leaderboard, is_valid_id, new_id};
