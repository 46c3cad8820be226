//! Kafka 消费者配置 Trait
//!
//! 构建消费者所需的最小配置接口，[`ConsumerConfig`] 是默认实现

use crate::config::{ConsumerConfig, SaslCredentials, SaslMechanism, SecurityProtocol};

/// Kafka 消费者配置 Trait
///
/// 任何需要构建 Kafka 消费者的配置都应该实现此 trait
pub trait KafkaConsumerConfig: Send + Sync {
    /// Kafka Bootstrap Servers 地址（逗号分隔）
    fn kafka_bootstrap(&self) -> String;

    /// Consumer Group ID
    fn consumer_group(&self) -> &str;

    /// 订阅的 Topic 列表
    fn kafka_topics(&self) -> Vec<&str>;

    /// 接入协议，默认 SASL_PLAINTEXT
    fn security_protocol(&self) -> SecurityProtocol {
        SecurityProtocol::SaslPlaintext
    }

    /// SASL 机制，默认 PLAIN
    fn sasl_mechanism(&self) -> SaslMechanism {
        SaslMechanism::Plain
    }

    /// SASL 用户名密码
    fn sasl_credentials(&self) -> Option<&SaslCredentials> {
        None
    }

    /// 会话超时（毫秒），默认 30000
    fn session_timeout_ms(&self) -> u64 {
        30000
    }

    /// 是否自动提交 offset，默认 true
    fn enable_auto_commit(&self) -> bool {
        true
    }

    /// Offset 重置策略，默认 "latest"
    fn auto_offset_reset(&self) -> &str {
        "latest"
    }

    /// 客户端标识
    fn client_id(&self) -> Option<&str> {
        None
    }
}

impl KafkaConsumerConfig for ConsumerConfig {
    fn kafka_bootstrap(&self) -> String {
        self.bootstrap_servers().join(",")
    }

    fn consumer_group(&self) -> &str {
        self.group_id()
    }

    fn kafka_topics(&self) -> Vec<&str> {
        self.topics().iter().map(String::as_str).collect()
    }

    fn security_protocol(&self) -> SecurityProtocol {
        ConsumerConfig::security_protocol(self)
    }

    fn sasl_mechanism(&self) -> SaslMechanism {
        ConsumerConfig::sasl_mechanism(self)
    }

    fn sasl_credentials(&self) -> Option<&SaslCredentials> {
        self.credentials()
    }

    fn session_timeout_ms(&self) -> u64 {
        self.session_timeout().as_millis() as u64
    }

    fn auto_offset_reset(&self) -> &str {
        ConsumerConfig::auto_offset_reset(self)
    }

    fn client_id(&self) -> Option<&str> {
        ConsumerConfig::client_id(self)
    }
}
