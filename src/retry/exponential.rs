use super::RetryPolicy;
use std::time::Duration;

/// 指数退避重试策略
pub struct ExponentialBackoffPolicy {
    base_delay: Duration,
    max_delay: Duration,
}

impl ExponentialBackoffPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            base_delay,
            max_delay,
        }
    }
}

impl Default for ExponentialBackoffPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_secs(10))
    }
}

impl RetryPolicy for ExponentialBackoffPolicy {
    fn backoff_duration(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(10) as u32;
        let delay = self.base_delay.saturating_mul(1 << exponent);
        delay.min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = ExponentialBackoffPolicy::new(Duration::from_millis(100), Duration::from_secs(1));
        assert_eq!(policy.backoff_duration(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_duration(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_duration(4), Duration::from_millis(800));
        assert_eq!(policy.backoff_duration(5), Duration::from_secs(1));
        assert_eq!(policy.backoff_duration(500), Duration::from_secs(1));
    }

    #[test]
    fn test_should_retry_follows_error_code() {
        let policy = ExponentialBackoffPolicy::default();
        assert!(policy.should_retry(ErrorCode::AllBrokersDown));
        assert!(!policy.should_retry(ErrorCode::AuthenticationFailed));
    }
}
