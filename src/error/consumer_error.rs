//! 消费者统一错误类型

use super::code::ErrorCode;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use std::path::PathBuf;
use thiserror::Error;

/// 配置加载错误
///
/// 所有变体都在建立任何网络连接之前产生
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 缺少必填配置项
    #[error("missing required property `{0}`")]
    MissingKey(&'static str),

    /// topic 列表解析后为空
    #[error("property `topic` does not name any topic")]
    EmptyTopics,

    /// 配置值非法
    #[error("invalid value `{value}` for property `{key}`: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// SASL 协议下没有可用的用户名密码
    #[error("security protocol {0} requires SASL credentials (sasl.username/sasl.password or a JAAS file)")]
    MissingCredentials(String),

    /// JAAS 文件格式错误
    #[error("malformed JAAS configuration: {0}")]
    Jaas(String),

    /// TOML 配置文件格式错误
    #[error("malformed TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn invalid(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 映射到错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::MissingKey(_) | ConfigError::EmptyTopics => ErrorCode::MissingProperty,
            ConfigError::InvalidValue { .. } => ErrorCode::InvalidProperty,
            ConfigError::MissingCredentials(_) => ErrorCode::MissingCredentials,
            ConfigError::Io { .. } | ConfigError::Jaas(_) | ConfigError::Toml(_) => {
                ErrorCode::ConfigurationError
            }
        }
    }
}

/// 消费者错误类型
#[derive(Error, Debug)]
pub enum ConsumerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("kafka error: {0}")]
    Kafka(#[from] KafkaError),

    /// 非 Kafka 客户端产生的拉取失败（例如测试替身）
    #[error("poll failed: {0}")]
    Poll(String),
}

/// 消费者结果类型
pub type Result<T> = std::result::Result<T, ConsumerError>;

impl ConsumerError {
    pub fn poll(msg: impl Into<String>) -> Self {
        ConsumerError::Poll(msg.into())
    }

    /// 对错误进行分类，用于决定日志级别和是否值得退避重试
    pub fn code(&self) -> ErrorCode {
        match self {
            ConsumerError::Config(err) => err.code(),
            ConsumerError::Kafka(err) => classify_kafka_error(err),
            ConsumerError::Poll(_) => ErrorCode::MessageConsumptionFailed,
        }
    }
}

fn classify_kafka_error(err: &KafkaError) -> ErrorCode {
    match err {
        KafkaError::ClientConfig(..) => return ErrorCode::InvalidProperty,
        KafkaError::ClientCreation(_) => return ErrorCode::ConsumerCreationFailed,
        KafkaError::Subscription(_) => return ErrorCode::SubscriptionFailed,
        _ => {}
    }

    match err.rdkafka_error_code() {
        Some(RDKafkaErrorCode::SaslAuthenticationFailed)
        | Some(RDKafkaErrorCode::Authentication) => ErrorCode::AuthenticationFailed,
        Some(RDKafkaErrorCode::TopicAuthorizationFailed) => ErrorCode::TopicAuthorizationFailed,
        Some(RDKafkaErrorCode::GroupAuthorizationFailed) => ErrorCode::GroupAuthorizationFailed,
        Some(RDKafkaErrorCode::BrokerTransportFailure) | Some(RDKafkaErrorCode::Resolve) => {
            ErrorCode::BrokerTransportFailure
        }
        Some(RDKafkaErrorCode::AllBrokersDown) => ErrorCode::AllBrokersDown,
        Some(RDKafkaErrorCode::RequestTimedOut) | Some(RDKafkaErrorCode::OperationTimedOut) => {
            ErrorCode::NetworkTimeout
        }
        Some(RDKafkaErrorCode::UnknownTopicOrPartition) => ErrorCode::UnknownTopicOrPartition,
        Some(_) => ErrorCode::MessageConsumptionFailed,
        None => ErrorCode::UnknownError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn test_sasl_failure_is_authentication() {
        let err = ConsumerError::from(KafkaError::MessageConsumption(
            RDKafkaErrorCode::SaslAuthenticationFailed,
        ));
        assert_eq!(err.code(), ErrorCode::AuthenticationFailed);
        assert_eq!(err.code().category(), ErrorCategory::Authentication);
        assert!(!err.code().is_retryable());
    }

    #[test]
    fn test_transport_failure_is_retryable() {
        let err = ConsumerError::from(KafkaError::MessageConsumption(
            RDKafkaErrorCode::AllBrokersDown,
        ));
        assert_eq!(err.code(), ErrorCode::AllBrokersDown);
        assert!(err.code().is_retryable());
    }

    #[test]
    fn test_config_error_codes() {
        let err = ConsumerError::from(ConfigError::MissingKey("group.id"));
        assert_eq!(err.code(), ErrorCode::MissingProperty);
        assert_eq!(err.to_string(), "configuration error: missing required property `group.id`");
    }
}
