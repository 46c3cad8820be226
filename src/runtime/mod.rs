//! 消费者运行时框架
//!
//! 统一管理消费任务的生命周期：启动、等待关闭信号、优雅关闭。
//! 每个任务拿到独立的关闭信号，收到后自行释放持有的连接。

pub mod config;
pub mod runtime;
pub mod task;

pub use config::RuntimeConfig;
pub use runtime::ServiceRuntime;
pub use task::{MessageConsumer, MessageConsumerTask, Task, TaskResult};
