//! 一次性结果句柄

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::Instrument;

use crate::error::{Result, ServiceError};

/// 存储操作的一次性结果
///
/// 背后的任务在创建时就已开始执行，await 只是取回结果。
/// 结果恰好交付一次；任务在交付前退出（例如 panic）时得到
/// `ChannelClosed`。丢弃句柄不会取消任务。
#[must_use = "the store operation runs regardless, but its result is lost if not awaited"]
#[derive(Debug)]
pub struct StoreFuture<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T: Send + 'static> StoreFuture<T> {
    /// 在独立任务中执行 `work`，继承当前 span
    pub fn spawn<F>(work: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        tokio::spawn(
            async move {
                if tx.send(work.await).is_err() {
                    tracing::debug!("Store result discarded, receiver dropped");
                }
            }
            .in_current_span(),
        );

        Self { rx }
    }
}

impl<T> StoreFuture<T> {
    /// 已有结果时直接构造，不创建任务（参数校验失败等）
    pub fn ready(result: Result<T>) -> Self {
        let (tx, rx) = oneshot::channel();
        // 接收端还在本函数内，发送不会失败
        let _ = tx.send(result);
        Self { rx }
    }
}

impl<T> Future for StoreFuture<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(ServiceError::ChannelClosed)))
    }
}
