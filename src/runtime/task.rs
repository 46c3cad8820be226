//! 任务定义模块
//!
//! 提供统一的任务抽象，运行时通过它启动和关闭消息消费者

use std::future::Future;
use std::pin::Pin;

/// 任务执行结果
pub type TaskResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// 任务 trait
///
/// 所有需要在运行时中管理的任务都必须实现此 trait
pub trait Task: Send {
    /// 获取任务名称
    fn name(&self) -> &str;

    /// 运行任务
    ///
    /// # 参数
    /// * `shutdown_rx` - 关闭信号接收器，当收到信号时任务应该优雅关闭
    fn run(
        self: Box<Self>,
        shutdown_rx: tokio::sync::oneshot::Receiver<()>,
    ) -> Pin<Box<dyn Future<Output = TaskResult> + Send>>;
}

// -------- Message Consumer Task --------

/// 消息消费者 trait
///
/// 消费者在收到关闭信号后负责释放自己持有的连接
pub trait MessageConsumer: Send {
    /// 消费消息直到收到关闭信号
    ///
    /// # 参数
    /// * `shutdown_rx` - 关闭信号接收器
    fn consume(
        self: Box<Self>,
        shutdown_rx: tokio::sync::oneshot::Receiver<()>,
    ) -> Pin<Box<dyn Future<Output = TaskResult> + Send>>;
}

/// 消息消费者任务
///
/// 将实现了 `MessageConsumer` trait 的对象包装成 `Task`
pub struct MessageConsumerTask {
    name: String,
    consumer: Box<dyn MessageConsumer>,
}

impl MessageConsumerTask {
    /// 创建新的消息消费者任务
    pub fn new(name: impl Into<String>, consumer: Box<dyn MessageConsumer>) -> Self {
        Self {
            name: name.into(),
            consumer,
        }
    }
}

impl Task for MessageConsumerTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(
        self: Box<Self>,
        shutdown_rx: tokio::sync::oneshot::Receiver<()>,
    ) -> Pin<Box<dyn Future<Output = TaskResult> + Send>> {
        self.consumer.consume(shutdown_rx)
    }
}
