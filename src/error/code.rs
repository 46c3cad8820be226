//! 错误代码和错误类别定义
//!
//! 消费者只关心少数几类错误，按类别分段：
//! - 1000-1999: 配置相关错误
//! - 2000-2999: 认证相关错误
//! - 3000-3999: 网络相关错误
//! - 4000-4999: 消费相关错误
//! - 9000-9999: 通用错误

use std::fmt;

/// 错误代码枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    // ============================================================
    // 配置相关错误 (1000-1999)
    // ============================================================
    ConfigurationError = 1000,
    MissingProperty = 1001,
    InvalidProperty = 1002,
    MissingCredentials = 1003,

    // ============================================================
    // 认证相关错误 (2000-2999)
    // ============================================================
    AuthenticationFailed = 2000,
    TopicAuthorizationFailed = 2001,
    GroupAuthorizationFailed = 2002,

    // ============================================================
    // 网络相关错误 (3000-3999)
    // ============================================================
    BrokerTransportFailure = 3000,
    AllBrokersDown = 3001,
    NetworkTimeout = 3002,

    // ============================================================
    // 消费相关错误 (4000-4999)
    // ============================================================
    ConsumerCreationFailed = 4000,
    SubscriptionFailed = 4001,
    MessageConsumptionFailed = 4002,
    UnknownTopicOrPartition = 4003,

    // ============================================================
    // 通用错误 (9000-9999)
    // ============================================================
    UnknownError = 9999,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ErrorCode {
    /// 获取错误代码的数字值
    #[inline]
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }

    /// 获取错误代码的英文标识符
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorCode::MissingProperty => "MISSING_PROPERTY",
            ErrorCode::InvalidProperty => "INVALID_PROPERTY",
            ErrorCode::MissingCredentials => "MISSING_CREDENTIALS",
            ErrorCode::AuthenticationFailed => "AUTHENTICATION_FAILED",
            ErrorCode::TopicAuthorizationFailed => "TOPIC_AUTHORIZATION_FAILED",
            ErrorCode::GroupAuthorizationFailed => "GROUP_AUTHORIZATION_FAILED",
            ErrorCode::BrokerTransportFailure => "BROKER_TRANSPORT_FAILURE",
            ErrorCode::AllBrokersDown => "ALL_BROKERS_DOWN",
            ErrorCode::NetworkTimeout => "NETWORK_TIMEOUT",
            ErrorCode::ConsumerCreationFailed => "CONSUMER_CREATION_FAILED",
            ErrorCode::SubscriptionFailed => "SUBSCRIPTION_FAILED",
            ErrorCode::MessageConsumptionFailed => "MESSAGE_CONSUMPTION_FAILED",
            ErrorCode::UnknownTopicOrPartition => "UNKNOWN_TOPIC_OR_PARTITION",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// 获取错误代码的类别（用于错误分类）
    pub fn category(&self) -> ErrorCategory {
        match self.as_u32() {
            1000..=1999 => ErrorCategory::Configuration,
            2000..=2999 => ErrorCategory::Authentication,
            3000..=3999 => ErrorCategory::Network,
            4000..=4999 => ErrorCategory::Consumer,
            _ => ErrorCategory::General,
        }
    }

    /// 判断是否为可重试的错误
    ///
    /// 认证和配置错误重试也不会成功，只会反复刷日志
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Consumer | ErrorCategory::General
        )
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Network,
    Consumer,
    General,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "CONFIGURATION"),
            ErrorCategory::Authentication => write!(f, "AUTHENTICATION"),
            ErrorCategory::Network => write!(f, "NETWORK"),
            ErrorCategory::Consumer => write!(f, "CONSUMER"),
            ErrorCategory::General => write!(f, "GENERAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ranges() {
        assert_eq!(ErrorCode::MissingProperty.category(), ErrorCategory::Configuration);
        assert_eq!(ErrorCode::AuthenticationFailed.category(), ErrorCategory::Authentication);
        assert_eq!(ErrorCode::AllBrokersDown.category(), ErrorCategory::Network);
        assert_eq!(ErrorCode::SubscriptionFailed.category(), ErrorCategory::Consumer);
        assert_eq!(ErrorCode::UnknownError.category(), ErrorCategory::General);
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::NetworkTimeout.is_retryable());
        assert!(ErrorCode::MessageConsumptionFailed.is_retryable());
        assert!(!ErrorCode::AuthenticationFailed.is_retryable());
        assert!(!ErrorCode::InvalidProperty.is_retryable());
    }
}
