//! Kafka 消费者构建器
//!
//! 把配置翻译成 librdkafka 参数并创建消费者、订阅 topic

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use tracing::{error, info};

use crate::kafka::consumer_config::KafkaConsumerConfig;

/// 生成 librdkafka 客户端配置
///
/// 单独拆出来便于在不连接 broker 的情况下检查参数
pub fn kafka_client_config(config: &dyn KafkaConsumerConfig) -> ClientConfig {
    let protocol = config.security_protocol();

    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", config.kafka_bootstrap())
        .set("group.id", config.consumer_group())
        .set("enable.partition.eof", "false")
        .set("session.timeout.ms", config.session_timeout_ms().to_string())
        .set("enable.auto.commit", config.enable_auto_commit().to_string())
        .set("auto.offset.reset", config.auto_offset_reset())
        .set("security.protocol", protocol.as_str());

    if protocol.uses_sasl() {
        client_config.set("sasl.mechanism", config.sasl_mechanism().as_str());
        if let Some(credentials) = config.sasl_credentials() {
            client_config
                .set("sasl.username", credentials.username())
                .set("sasl.password", credentials.password());
        }
    }

    if let Some(client_id) = config.client_id() {
        client_config.set("client.id", client_id);
    }

    client_config
}

/// 构建 Kafka 消费者
///
/// 创建句柄本身不会阻塞在网络上，broker 连接由 librdkafka 后台线程建立
pub fn build_kafka_consumer(config: &dyn KafkaConsumerConfig) -> Result<StreamConsumer, KafkaError> {
    kafka_client_config(config).create()
}

/// 订阅全部 topic
pub fn subscribe_topics(consumer: &StreamConsumer, topics: &[&str]) -> Result<(), KafkaError> {
    match consumer.subscribe(topics) {
        Ok(()) => {
            info!(topics = ?topics, "Successfully subscribed to Kafka topics");
            Ok(())
        }
        Err(err) => {
            error!(error = %err, topics = ?topics, "Failed to subscribe to Kafka topics");
            Err(err)
        }
    }
}
