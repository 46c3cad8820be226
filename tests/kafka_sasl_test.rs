//! SASL/PLAIN broker 集成测试
//!
//! 这些测试需要运行中的、开启 SASL_PLAINTEXT 的 Kafka 实例。
//! 默认情况下，测试会被忽略，需要使用 `cargo test --test kafka_sasl_test -- --ignored` 运行。
//!
//! 环境变量：
//! - `CKAFKA_TEST_BOOTSTRAP` - 接入点，默认 127.0.0.1:9092
//! - `CKAFKA_TEST_USERNAME` / `CKAFKA_TEST_PASSWORD` - PLAIN 用户名密码，默认 admin/admin-secret
//! - `CKAFKA_TEST_TOPIC` - 已存在的 topic，默认 ckafka-demo

use std::time::Duration;

use ckafka_sasl_consumer::config::{ConsumerConfig, Properties};
use ckafka_sasl_consumer::consume::{PollLoop, PollOutcome};
use ckafka_sasl_consumer::kafka::ConsumerSession;
use ckafka_sasl_consumer::{ErrorCategory, FixedRetryPolicy};

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn test_config(password: &str) -> ConsumerConfig {
    let props: Properties = [
        ("bootstrap.servers", env_or("CKAFKA_TEST_BOOTSTRAP", "127.0.0.1:9092")),
        ("group.id", "ckafka-sasl-consumer-test".to_string()),
        ("topic", env_or("CKAFKA_TEST_TOPIC", "ckafka-demo")),
        ("sasl.username", env_or("CKAFKA_TEST_USERNAME", "admin")),
        ("sasl.password", password.to_string()),
        ("auto.offset.reset", "earliest".to_string()),
        ("poll.timeout.ms", "2000".to_string()),
    ]
    .into_iter()
    .collect();

    ConsumerConfig::from_properties(&props).unwrap()
}

#[tokio::test]
#[ignore]
async fn test_sasl_consumer_polls() {
    let config = test_config(&env_or("CKAFKA_TEST_PASSWORD", "admin-secret"));
    let session = ConsumerSession::connect(&config).unwrap();
    let mut poll_loop = PollLoop::new(session, Vec::<u8>::new()).with_retry_policy(FixedRetryPolicy::immediate());

    for _ in 0..5 {
        let outcome = poll_loop.run_once().await.unwrap();
        assert!(matches!(outcome, PollOutcome::Records(_)), "unexpected outcome: {outcome:?}");
    }

    poll_loop.close();
}

#[tokio::test]
#[ignore]
async fn test_wrong_password_is_reported_not_fatal() {
    let config = test_config("definitely-wrong");
    let session = ConsumerSession::connect(&config).unwrap();
    let mut poll_loop = PollLoop::new(session, Vec::<u8>::new()).with_retry_policy(FixedRetryPolicy::immediate());

    let mut saw_auth_failure = false;
    let deadline = tokio::time::Instant::now() + Duration::from_secs(20);
    while tokio::time::Instant::now() < deadline {
        if let PollOutcome::Failed(code) = poll_loop.run_once().await.unwrap() {
            if code.category() == ErrorCategory::Authentication {
                saw_auth_failure = true;
                break;
            }
        }
    }

    assert!(saw_auth_failure);
    assert!(poll_loop.stats().errors >= 1);
    poll_loop.close();
}
