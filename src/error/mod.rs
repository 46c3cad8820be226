//! 错误处理模块
//!
//! 提供配置错误、消费者错误以及错误代码分类

pub mod code;
pub mod consumer_error;

// 重新导出公共类型
pub use code::{ErrorCategory, ErrorCode};
pub use consumer_error::{ConfigError, ConsumerError, Result};

/// 基础设施层（二进制入口、运行时）默认使用的结果类型
pub type InfraResult<T> = anyhow::Result<T>;
