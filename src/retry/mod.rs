//! 拉取失败后的退避策略
//!
//! 消费循环不会因为错误退出，策略只决定下一次拉取前等待多久

pub mod exponential;
pub mod fixed;

pub use exponential::ExponentialBackoffPolicy;
pub use fixed::FixedRetryPolicy;

use crate::error::ErrorCode;
use std::time::Duration;

/// 退避策略 trait
pub trait RetryPolicy: Send + Sync {
    /// 错误是否可能通过重试恢复，不可恢复的错误按 error 级别记录
    fn should_retry(&self, error: ErrorCode) -> bool {
        error.is_retryable()
    }

    /// 第 `attempt` 次连续失败（从 1 开始）后的等待时间
    fn backoff_duration(&self, attempt: usize) -> Duration;
}
