//! 消费循环
//!
//! [`RecordSource`] 是消费循环与 Kafka 客户端之间的接缝，
//! [`ConsumerSession`](crate::kafka::ConsumerSession) 是生产实现，测试里可以替换成脚本化的数据源。

pub mod poll_loop;

pub use poll_loop::{PollLoop, PollOutcome, PollState, PollStats, CONSUMER_ERROR_LINE};

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Record;

/// 批量消息来源
#[async_trait]
pub trait RecordSource: Send {
    /// 拉取一批消息，空批次表示等待超时
    async fn poll_batch(&mut self) -> Result<Vec<Record>>;

    /// 释放底层连接
    fn close(self)
    where
        Self: Sized,
    {
    }
}
