//! 工具函数模块

use tracing_subscriber::EnvFilter;

/// 默认日志过滤规则，librdkafka 自身的日志通过 `rdkafka` target 单独控制
pub const DEFAULT_LOG_FILTER: &str = "info,rdkafka=warn";

/// 构建日志过滤器，优先使用 `RUST_LOG`
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// 初始化 tracing，日志写到 stderr，stdout 只留给消费输出
///
/// 重复调用时保持第一次的设置
pub fn init_tracing(default: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
