//! 消费者会话
//!
//! 独占一个 `StreamConsumer`，负责订阅和有界批量拉取

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::{BorrowedMessage, Message};
use tracing::{debug, info};

use crate::config::ConsumerConfig;
use crate::consume::RecordSource;
use crate::error::Result;
use crate::kafka::consumer_builder::{build_kafka_consumer, subscribe_topics};
use crate::kafka::consumer_config::KafkaConsumerConfig;
use crate::types::Record;

/// 消费者会话
pub struct ConsumerSession {
    consumer: StreamConsumer,
    max_poll_records: usize,
    poll_timeout: Duration,
    /// 批次中途遇到的错误，留到下一次拉取时返回，避免丢掉已取到的消息
    deferred_error: Option<KafkaError>,
}

impl ConsumerSession {
    /// 创建消费者并订阅配置中的全部 topic
    pub fn connect(config: &ConsumerConfig) -> Result<Self> {
        let consumer = build_kafka_consumer(config)?;
        subscribe_topics(&consumer, &config.kafka_topics())?;

        info!(
            group_id = %config.group_id(),
            max_poll_records = config.max_poll_records(),
            poll_timeout_ms = config.poll_timeout().as_millis() as u64,
            "Consumer session established"
        );

        Ok(Self {
            consumer,
            max_poll_records: config.max_poll_records(),
            poll_timeout: config.poll_timeout(),
            deferred_error: None,
        })
    }

    /// 拉取一批消息
    ///
    /// 最多等待 `poll_timeout` 拿到第一条，之后只取已经到达的消息，
    /// 数量不超过 `max_poll_records`。超时返回空批次。
    pub async fn poll_batch(&mut self) -> Result<Vec<Record>> {
        if let Some(err) = self.deferred_error.take() {
            return Err(err.into());
        }

        let first = match tokio::time::timeout(self.poll_timeout, self.consumer.recv()).await {
            Ok(Ok(msg)) => to_record(&msg),
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => return Ok(Vec::new()),
        };

        let mut batch = Vec::with_capacity(self.max_poll_records);
        batch.push(first);

        while batch.len() < self.max_poll_records {
            match tokio::time::timeout(Duration::ZERO, self.consumer.recv()).await {
                Ok(Ok(msg)) => batch.push(to_record(&msg)),
                Ok(Err(err)) => {
                    debug!(error = %err, fetched = batch.len(), "Deferring error until next poll");
                    self.deferred_error = Some(err);
                    break;
                }
                Err(_) => break,
            }
        }

        Ok(batch)
    }

    /// 取消订阅并释放连接
    pub fn close(self) {
        self.consumer.unsubscribe();
        info!("Consumer session closed");
    }
}

#[async_trait]
impl RecordSource for ConsumerSession {
    async fn poll_batch(&mut self) -> Result<Vec<Record>> {
        ConsumerSession::poll_batch(self).await
    }

    fn close(self) {
        ConsumerSession::close(self)
    }
}

/// 按字符串反序列化 key 和 value，缺失时为空串
fn to_record(msg: &BorrowedMessage<'_>) -> Record {
    Record::new(
        msg.topic(),
        msg.partition(),
        msg.offset(),
        msg.key().map(String::from_utf8_lossy).unwrap_or_default(),
        msg.payload().map(String::from_utf8_lossy).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Properties;
    use crate::error::ConsumerError;
    use rdkafka::error::RDKafkaErrorCode;

    // 创建客户端句柄不会连接 broker
    fn offline_session() -> ConsumerSession {
        let props = Properties::parse(
            "bootstrap.servers=127.0.0.1:9092\n\
             group.id=session-test\n\
             topic=orders\n\
             security.protocol=PLAINTEXT\n",
        );
        let config = ConsumerConfig::from_properties(&props).unwrap();
        ConsumerSession {
            consumer: build_kafka_consumer(&config).unwrap(),
            max_poll_records: config.max_poll_records(),
            poll_timeout: config.poll_timeout(),
            deferred_error: None,
        }
    }

    #[tokio::test]
    async fn test_deferred_error_is_reported_once_on_next_poll() {
        let mut session = offline_session();
        session.deferred_error = Some(KafkaError::MessageConsumption(
            RDKafkaErrorCode::BrokerTransportFailure,
        ));

        let err = session.poll_batch().await.unwrap_err();
        assert!(matches!(
            err,
            ConsumerError::Kafka(KafkaError::MessageConsumption(RDKafkaErrorCode::BrokerTransportFailure))
        ));
        assert!(session.deferred_error.is_none());
    }
}
