//! 消费者运行时实现
//!
//! 负责：
//! - 启动消费任务
//! - 等待关闭信号（Ctrl+C）或任务自行退出
//! - 通知任务关闭并在超时内等待其释放连接

use std::future::Future;

use anyhow::Result;
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::runtime::config::RuntimeConfig;
use crate::runtime::task::{MessageConsumer, MessageConsumerTask, Task, TaskResult};

/// 消费者运行时
///
/// # 使用示例
///
/// ```rust,no_run
/// use ckafka_sasl_consumer::consume::PollLoop;
/// use ckafka_sasl_consumer::kafka::ConsumerSession;
/// use ckafka_sasl_consumer::runtime::ServiceRuntime;
///
/// # async fn demo(config: ckafka_sasl_consumer::config::ConsumerConfig) -> anyhow::Result<()> {
/// let session = ConsumerSession::connect(&config)?;
/// let poll_loop = PollLoop::new(session, std::io::stdout());
///
/// ServiceRuntime::new_consumer_only("ckafka-sasl-consumer")
///     .add_message_consumer("kafka-consumer", Box::new(poll_loop))
///     .run()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ServiceRuntime {
    service_name: String,
    tasks: Vec<Box<dyn Task>>,
    config: RuntimeConfig,
}

impl ServiceRuntime {
    /// 创建纯消费者服务运行时
    ///
    /// # 参数
    /// * `service_name` - 服务名称（用于日志）
    pub fn new_consumer_only(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            tasks: Vec::new(),
            config: RuntimeConfig::default(),
        }
    }

    /// 设置运行时配置
    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// 添加任务
    pub fn add_task(mut self, task: Box<dyn Task>) -> Self {
        info!(task_name = %task.name(), "Adding task to runtime");
        self.tasks.push(task);
        self
    }

    /// 添加消息消费者
    ///
    /// # 参数
    /// * `name` - 任务名称
    /// * `consumer` - 消息消费者实例
    pub fn add_message_consumer(
        self,
        name: impl Into<String>,
        consumer: Box<dyn MessageConsumer>,
    ) -> Self {
        self.add_task(Box::new(MessageConsumerTask::new(name, consumer)))
    }

    /// 运行直到 Ctrl+C
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutdown signal received (Ctrl+C)"),
                Err(e) => {
                    // 无法监听信号时不退出，进程只能被外部终止
                    error!(error = %e, "Failed to listen for Ctrl+C");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
    }

    /// 运行直到 `shutdown_signal` 完成或任一任务退出
    ///
    /// 执行以下步骤：
    /// 1. 启动所有任务
    /// 2. 等待关闭信号
    /// 3. 通知所有任务关闭
    /// 4. 在 `shutdown_timeout` 内等待任务结束，超时强制中止
    pub async fn run_until<F>(mut self, shutdown_signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        if self.tasks.is_empty() {
            return Err(anyhow::anyhow!("No tasks registered in runtime '{}'", self.service_name));
        }

        info!(
            service_name = %self.service_name,
            task_count = self.tasks.len(),
            "🚀 Starting consumer-only service runtime"
        );

        let tasks = std::mem::take(&mut self.tasks);
        let (mut join_set, task_shutdowns) = Self::start_tasks(tasks);

        let mut failed = false;
        tokio::select! {
            _ = shutdown_signal => {}
            Some(result) = join_set.join_next() => {
                failed = !matches!(result, Ok(Ok(())));
                warn!("A task exited on its own, shutting down runtime");
            }
        }

        for tx in task_shutdowns {
            let _ = tx.send(());
        }

        Self::wait_for_tasks_shutdown(&self.config, &mut join_set).await;

        info!(service_name = %self.service_name, "Service runtime stopped");
        if failed {
            return Err(anyhow::anyhow!("Runtime '{}' stopped after a task failure", self.service_name));
        }
        Ok(())
    }

    /// 启动所有任务
    ///
    /// 返回 JoinSet 和每个任务的关闭发送端
    fn start_tasks(tasks: Vec<Box<dyn Task>>) -> (JoinSet<TaskResult>, Vec<oneshot::Sender<()>>) {
        let mut join_set = JoinSet::new();
        let mut task_shutdowns = Vec::new();

        for task in tasks {
            let task_name = task.name().to_string();
            let (task_shutdown_tx, task_shutdown_rx) = oneshot::channel();
            task_shutdowns.push(task_shutdown_tx);

            let task_future = task.run(task_shutdown_rx);

            join_set.spawn(async move {
                let result = task_future.await;
                match &result {
                    Ok(_) => {
                        info!(task_name = %task_name, "✅ Task completed");
                    }
                    Err(e) => {
                        error!(task_name = %task_name, error = %e, "❌ Task failed");
                    }
                }
                result
            });
        }

        (join_set, task_shutdowns)
    }

    /// 等待所有任务关闭
    async fn wait_for_tasks_shutdown(config: &RuntimeConfig, join_set: &mut JoinSet<TaskResult>) {
        match tokio::time::timeout(config.shutdown_timeout, async {
            while let Some(result) = join_set.join_next().await {
                match result {
                    Ok(Ok(_)) => {
                        info!("Task completed gracefully");
                    }
                    Ok(Err(e)) => {
                        warn!("Task completed with error: {}", e);
                    }
                    Err(e) => {
                        warn!("Task join error: {}", e);
                    }
                }
            }
        })
        .await
        {
            Ok(_) => {
                info!("All tasks completed");
            }
            Err(_) => {
                warn!("Tasks shutdown timeout, forcing exit");
                join_set.abort_all();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct WaitForShutdown {
        stopped: Arc<AtomicBool>,
    }

    impl MessageConsumer for WaitForShutdown {
        fn consume(
            self: Box<Self>,
            shutdown_rx: oneshot::Receiver<()>,
        ) -> Pin<Box<dyn Future<Output = TaskResult> + Send>> {
            Box::pin(async move {
                let _ = shutdown_rx.await;
                self.stopped.store(true, Ordering::SeqCst);
                Ok(())
            })
        }
    }

    struct FailImmediately;

    impl MessageConsumer for FailImmediately {
        fn consume(
            self: Box<Self>,
            _shutdown_rx: oneshot::Receiver<()>,
        ) -> Pin<Box<dyn Future<Output = TaskResult> + Send>> {
            Box::pin(async { Err("broken output".into()) })
        }
    }

    #[tokio::test]
    async fn test_shutdown_signal_stops_consumer() {
        let stopped = Arc::new(AtomicBool::new(false));
        let (tx, rx) = oneshot::channel::<()>();

        let runtime = ServiceRuntime::new_consumer_only("test")
            .add_message_consumer("waiter", Box::new(WaitForShutdown { stopped: stopped.clone() }));

        let handle = tokio::spawn(runtime.run_until(async move {
            let _ = rx.await;
        }));
        tx.send(()).unwrap();

        handle.await.unwrap().unwrap();
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_task_failure_stops_runtime() {
        let runtime = ServiceRuntime::new_consumer_only("test")
            .with_config(RuntimeConfig::new().with_shutdown_timeout(Duration::from_millis(100)))
            .add_message_consumer("broken", Box::new(FailImmediately));

        let result = runtime.run_until(std::future::pending()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_runtime_is_rejected() {
        let result = ServiceRuntime::new_consumer_only("empty")
            .run_until(async {})
            .await;
        assert!(result.is_err());
    }
}
