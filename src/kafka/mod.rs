//! Kafka 接入模块
//!
//! 提供消费者配置接口、消费者构建以及消费者会话

pub mod consumer_builder;
pub mod consumer_config;
pub mod session;

pub use consumer_builder::{build_kafka_consumer, kafka_client_config, subscribe_topics};
pub use consumer_config::KafkaConsumerConfig;
pub use session::ConsumerSession;
