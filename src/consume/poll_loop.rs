//! 拉取循环状态机
//!
//! 两个状态：`Polling` 和 `Terminated`。每轮拉取一批消息并逐条输出
//! `Consume partition:<p> offset:<o>`；拉取失败输出 `consumer error!` 后继续下一轮。
//! 错误永远不会让循环退出，只有关闭信号能进入 `Terminated`。

use std::future::Future;
use std::io::Write;
use std::pin::Pin;

use tracing::{debug, error, info, warn};

use crate::consume::RecordSource;
use crate::retry::{ExponentialBackoffPolicy, RetryPolicy};
use crate::runtime::task::{MessageConsumer, TaskResult};
use crate::error::ErrorCode;

/// 拉取失败时输出的固定文本
pub const CONSUMER_ERROR_LINE: &str = "consumer error!";

/// 循环状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Terminated,
}

/// 单轮拉取结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// 成功拉取，值为本批消息数（可能为 0）
    Records(usize),
    /// 拉取失败，错误已被吞掉
    Failed(ErrorCode),
}

/// 运行统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub batches: u64,
    pub records: u64,
    pub errors: u64,
}

/// 拉取循环
pub struct PollLoop<S, W> {
    source: S,
    output: W,
    retry: Box<dyn RetryPolicy>,
    state: PollState,
    stats: PollStats,
    consecutive_failures: usize,
}

impl<S, W> PollLoop<S, W>
where
    S: RecordSource,
    W: Write + Send,
{
    /// 默认使用指数退避
    pub fn new(source: S, output: W) -> Self {
        Self {
            source,
            output,
            retry: Box::new(ExponentialBackoffPolicy::default()),
            state: PollState::Polling,
            stats: PollStats::default(),
            consecutive_failures: 0,
        }
    }

    pub fn with_retry_policy(mut self, policy: impl RetryPolicy + 'static) -> Self {
        self.retry = Box::new(policy);
        self
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn stats(&self) -> PollStats {
        self.stats
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// 执行一轮拉取
    ///
    /// 只有写输出失败才会返回错误，拉取错误被记录后作为 [`PollOutcome::Failed`] 返回
    pub async fn run_once(&mut self) -> std::io::Result<PollOutcome> {
        match self.source.poll_batch().await {
            Ok(records) => {
                self.consecutive_failures = 0;
                self.stats.batches += 1;
                self.stats.records += records.len() as u64;

                for record in &records {
                    writeln!(self.output, "{record}")?;
                }
                self.output.flush()?;

                if !records.is_empty() {
                    debug!(count = records.len(), "Batch consumed");
                }
                Ok(PollOutcome::Records(records.len()))
            }
            Err(err) => {
                self.consecutive_failures += 1;
                self.stats.errors += 1;

                let code = err.code();
                if self.retry.should_retry(code) {
                    warn!(
                        error = %err,
                        code = %code,
                        attempt = self.consecutive_failures,
                        "Poll failed, continuing"
                    );
                } else {
                    error!(
                        error = %err,
                        code = %code,
                        category = %code.category(),
                        attempt = self.consecutive_failures,
                        "Poll failed with non-retryable error, continuing"
                    );
                }

                writeln!(self.output, "{CONSUMER_ERROR_LINE}")?;
                self.output.flush()?;
                Ok(PollOutcome::Failed(code))
            }
        }
    }

    /// 循环拉取直到 `shutdown` 完成
    ///
    /// 关闭信号只在两轮之间检查，一轮拉取到的消息总会先全部输出，
    /// 因此关闭最多延迟一个拉取等待时间。
    /// 连续失败时按退避策略等待，等待期间同样响应关闭信号
    pub async fn run<F>(&mut self, shutdown: F) -> std::io::Result<PollStats>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        while self.state == PollState::Polling {
            let stop = tokio::select! {
                biased;
                _ = &mut shutdown => true,
                _ = std::future::ready(()) => false,
            };
            if stop {
                self.state = PollState::Terminated;
                break;
            }

            let outcome = self.run_once().await?;

            if let PollOutcome::Failed(_) = outcome {
                let delay = self.retry.backoff_duration(self.consecutive_failures);
                if delay.is_zero() {
                    continue;
                }
                tokio::select! {
                    biased;
                    _ = &mut shutdown => self.state = PollState::Terminated,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        info!(
            batches = self.stats.batches,
            records = self.stats.records,
            errors = self.stats.errors,
            "Poll loop terminated"
        );
        Ok(self.stats)
    }

    /// 释放数据源
    pub fn close(self) {
        self.source.close();
    }
}

impl<S, W> MessageConsumer for PollLoop<S, W>
where
    S: RecordSource + 'static,
    W: Write + Send + 'static,
{
    fn consume(
        self: Box<Self>,
        shutdown_rx: tokio::sync::oneshot::Receiver<()>,
    ) -> Pin<Box<dyn Future<Output = TaskResult> + Send>> {
        Box::pin(async move {
            let mut poll_loop = *self;
            let result = poll_loop
                .run(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            poll_loop.close();
            result?;
            Ok(())
        })
    }
}
