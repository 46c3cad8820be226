use super::RetryPolicy;
use std::time::Duration;

/// 固定延迟重试策略
///
/// 延迟为零时退化为立即重试
pub struct FixedRetryPolicy {
    delay: Duration,
}

impl FixedRetryPolicy {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// 不等待，失败后立刻进入下一次拉取
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl RetryPolicy for FixedRetryPolicy {
    fn backoff_duration(&self, _attempt: usize) -> Duration {
        self.delay
    }
}
