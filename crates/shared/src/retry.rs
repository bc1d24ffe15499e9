//! 重试策略与执行器
//!
//! 指数退避，用于连接池耗尽、网络抖动这类瞬时故障。
//! 哪些错误值得重试由调用方判断，执行器本身不理解错误类型。

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

/// 重试策略
///
/// 第 n 次重试前等待 `initial_delay * multiplier^n`，不超过 `max_delay`
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 最大重试次数（不含首次执行）
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    /// 3 次重试，1s 起步，翻倍，封顶 30s
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// 不等待、立即重试
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// 第 `retry` 次重试前的等待时间（从 0 开始）
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        let scaled = self.initial_delay.as_secs_f64() * self.multiplier.powi(retry as i32);
        Duration::from_secs_f64(scaled.min(self.max_delay.as_secs_f64()).max(0.0))
    }

    /// 已重试 `retry` 次后是否还能继续
    pub fn should_retry(&self, retry: u32) -> bool {
        retry < self.max_retries
    }

    /// 按顺序给出每次重试前的等待时间，长度为 `max_retries`
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_retries).map(|retry| self.delay_for_attempt(retry))
    }
}

/// 按策略执行异步操作
///
/// 成功或遇到不可重试的错误时立即返回；重试用尽后返回最后一次的错误
pub async fn retry_with_policy<F, Fut, T, E>(
    policy: &RetryPolicy,
    operation_name: &str,
    is_retryable: impl Fn(&E) -> bool,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut delays = policy.delays();
    let mut retries: u32 = 0;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if retries > 0 {
                    info!(operation = operation_name, retries, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !is_retryable(&err) {
            warn!(operation = operation_name, error = %err, "Operation failed, not retryable");
            return Err(err);
        }

        let Some(delay) = delays.next() else {
            warn!(
                operation = operation_name,
                retries,
                error = %err,
                "Operation failed, retries exhausted"
            );
            return Err(err);
        };

        warn!(
            operation = operation_name,
            retry = retries + 1,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Operation failed, retrying"
        );
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        retries += 1;
    }
}
