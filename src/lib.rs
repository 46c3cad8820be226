//! CKafka SASL/PLAIN consumer
//!
//! Loads connection properties, subscribes a single consumer to one or more topics
//! and polls records, printing partition/offset metadata. Broker discovery, group
//! coordination, offset management and the SASL handshake are all delegated to
//! librdkafka through `rdkafka`.

pub mod config;
pub mod consume;
pub mod error;
pub mod kafka;
pub mod retry;
pub mod runtime;
pub mod types;
pub mod utils;

// Re-exports
pub use config::{ConsumerConfig, Properties, SaslCredentials, SaslMechanism, SecurityProtocol, parse_topics};
pub use consume::{PollLoop, PollOutcome, PollState, PollStats, RecordSource};
pub use error::{ConfigError, ConsumerError, ErrorCategory, ErrorCode, Result};
pub use kafka::{ConsumerSession, KafkaConsumerConfig};
pub use retry::{ExponentialBackoffPolicy, FixedRetryPolicy, RetryPolicy};
pub use runtime::{RuntimeConfig, ServiceRuntime};
pub use types::Record;
