//! 事件分类器
//!
//! 决定一条 Webhook 事件是否计分。每个 PR 的状态隐含在标签记录中：
//! 有记录为"已打标"，无记录为"未打标"。
//!
//! | 事件 | 条件 | 动作 |
//! |------|------|------|
//! | labeled | 计分标签 | 写入标签记录 |
//! | unlabeled | 计分标签 | 删除标签记录 |
//! | closed | 已合并且有标签记录 | 作者加一分，后台删除标签记录 |
//! | closed | 已合并但无标签记录 | 无操作 |
//! | 其他 | - | 无操作 |
//!
//! 豁免用户的任何事件都直接忽略，不访问存储。

use std::sync::Arc;

use leaderboard_shared::observability::metrics;
use leaderboard_shared::retry::{RetryPolicy, retry_with_policy};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, instrument};

use super::ScoringPolicy;
use crate::error::{Result, ServiceError};
use crate::models::{EventAction, WebhookEvent};
use crate::store::RankingStore;

/// 事件被忽略的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    ExemptAuthor,
    NotQualifyingLabel,
    NotMerged,
    /// 合并时 PR 没有计分标签记录
    NeverLabeled,
    UnhandledAction(String),
}

/// 分类结果
#[derive(Debug)]
pub enum Outcome {
    Ignored(IgnoreReason),
    LabelRecorded {
        pr_id: i64,
    },
    LabelRemoved {
        pr_id: i64,
    },
    /// 已加分。`cleanup` 是后台删除标签记录的任务，调用方不必等待
    Awarded {
        pr_id: i64,
        username: String,
        points: i64,
        cleanup: JoinHandle<()>,
    },
}

impl Outcome {
    /// 用于日志和指标的结果标签
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ignored(_) => "ignored",
            Self::LabelRecorded { .. } => "label_recorded",
            Self::LabelRemoved { .. } => "label_removed",
            Self::Awarded { .. } => "awarded",
        }
    }

    pub fn is_awarded(&self) -> bool {
        matches!(self, Self::Awarded { .. })
    }
}

/// 事件分类器
#[derive(Clone)]
pub struct EventClassifier {
    store: RankingStore,
    policy: Arc<ScoringPolicy>,
    leaderboard_id: String,
    cleanup_retry: RetryPolicy,
}

impl EventClassifier {
    pub fn new(
        store: RankingStore,
        policy: Arc<ScoringPolicy>,
        leaderboard_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            policy,
            leaderboard_id: leaderboard_id.into(),
            cleanup_retry: RetryPolicy::default(),
        }
    }

    /// 设置加分后删除标签记录的重试策略
    pub fn with_cleanup_policy(mut self, policy: RetryPolicy) -> Self {
        self.cleanup_retry = policy;
        self
    }

    pub fn leaderboard_id(&self) -> &str {
        &self.leaderboard_id
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// 处理一条事件
    ///
    /// 返回的错误只来自关键路径（标签读写、加分）。标签记录不存在
    /// 不是错误；加分后的标签清理失败只记录日志，不回滚加分。
    #[instrument(
        skip(self, event),
        fields(pr_id = event.pr_id(), action = %event.action, username = %event.author())
    )]
    pub async fn classify(&self, event: &WebhookEvent) -> Result<Outcome> {
        if self.policy.is_exempt(event.author()) {
            debug!("Author is exempt, skipping");
            return Ok(Outcome::Ignored(IgnoreReason::ExemptAuthor));
        }

        let pr_id = event.pr_id();

        match &event.action {
            EventAction::Labeled => {
                if !self.policy.is_qualifying(event.label_name()) {
                    return Ok(Outcome::Ignored(IgnoreReason::NotQualifyingLabel));
                }

                self.store.save_label(pr_id, event.label_name()).await?;
                metrics::record_label_change("recorded");
                info!("Qualifying label recorded");
                Ok(Outcome::LabelRecorded { pr_id })
            }
            EventAction::Unlabeled => {
                if !self.policy.is_qualifying(event.label_name()) {
                    return Ok(Outcome::Ignored(IgnoreReason::NotQualifyingLabel));
                }

                self.store.delete_label(pr_id).await?;
                metrics::record_label_change("removed");
                info!("Qualifying label removed");
                Ok(Outcome::LabelRemoved { pr_id })
            }
            EventAction::Closed => {
                if !event.pull_request.is_merged() {
                    return Ok(Outcome::Ignored(IgnoreReason::NotMerged));
                }
                self.award_merged(pr_id, event.author()).await
            }
            EventAction::Other(action) => {
                debug!("Unhandled action");
                Ok(Outcome::Ignored(IgnoreReason::UnhandledAction(action.clone())))
            }
        }
    }

    async fn award_merged(&self, pr_id: i64, username: &str) -> Result<Outcome> {
        match self.store.get_label(pr_id).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                debug!("Merged without qualifying label, not counted");
                return Ok(Outcome::Ignored(IgnoreReason::NeverLabeled));
            }
            Err(e) => return Err(e),
        }

        let points = self
            .store
            .upsert_and_award(&self.leaderboard_id, username)
            .await?;
        metrics::record_points_awarded(1);
        info!(points, "Point awarded for merged pull request");

        let cleanup = self.spawn_label_cleanup(pr_id);

        Ok(Outcome::Awarded {
            pr_id,
            username: username.to_string(),
            points,
            cleanup,
        })
    }

    /// 后台删除已计分 PR 的标签记录，失败按策略重试，最终失败只记录日志
    fn spawn_label_cleanup(&self, pr_id: i64) -> JoinHandle<()> {
        let store = self.store.clone();
        let policy = self.cleanup_retry.clone();

        tokio::spawn(
            async move {
                let result = retry_with_policy(
                    &policy,
                    "delete_label",
                    ServiceError::is_retryable,
                    || store.delete_label(pr_id),
                )
                .await;

                match result {
                    Ok(()) => debug!("Label cleared after award"),
                    Err(e) => {
                        error!(error = %e, "Label cleanup failed, award kept");
                        metrics::record_label_cleanup_failure();
                    }
                }
            }
            .in_current_span(),
        )
    }
}
