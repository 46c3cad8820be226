//! 配置加载集成测试
//!
//! 全部在本地文件上完成，不需要 broker

use ckafka_sasl_consumer::config::{ConsumerConfig, Properties};
use ckafka_sasl_consumer::{ConfigError, SecurityProtocol};
use std::io::Write;
use std::time::Duration;
use tempfile::{Builder, NamedTempFile};

fn write_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_properties_file() {
    let file = write_file(
        ".properties",
        "## 接入点\n\
         bootstrap.servers=ckafka-xxxx.ap-guangzhou.ckafka.tencentcloudmq.com:50000\n\
         topic=orders, payments ,audit\n\
         group.id=demo-group\n\
         sasl.username=alice\n\
         sasl.password=secret\n\
         max.poll.records=10\n",
    );

    let props = Properties::load(file.path()).unwrap();
    let config = ConsumerConfig::from_properties(&props).unwrap();

    assert_eq!(config.group_id(), "demo-group");
    assert_eq!(config.max_poll_records(), 10);
    assert_eq!(
        config.topics().iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["audit", "orders", "payments"]
    );
}

#[test]
fn test_missing_group_id_fails_before_connecting() {
    let file = write_file(
        ".properties",
        "bootstrap.servers=127.0.0.1:9092\ntopic=orders\nsasl.username=a\nsasl.password=b\n",
    );

    let props = Properties::load(file.path()).unwrap();
    let err = ConsumerConfig::from_properties(&props).unwrap_err();
    assert!(matches!(err, ConfigError::MissingKey("group.id")));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = Properties::load("/definitely/not/here/kafka.properties").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_credentials_from_jaas_file() {
    let jaas = write_file(
        ".conf",
        "KafkaClient {\n  \
         org.apache.kafka.common.security.plain.PlainLoginModule required\n  \
         username=\"bob\"\n  \
         password=\"hunter2\";\n};\n",
    );
    let props = Properties::parse(&format!(
        "bootstrap.servers=127.0.0.1:9092\n\
         group.id=g\n\
         topic=t\n\
         instance.id=ckafka-42\n\
         java.security.auth.login.config={}\n",
        jaas.path().display()
    ));

    let config = ConsumerConfig::from_properties(&props).unwrap();
    let creds = config.credentials().unwrap();
    assert_eq!(creds.username(), "ckafka-42#bob");
    assert_eq!(creds.password(), "hunter2");
}

#[test]
fn test_load_decodes_escaped_values() {
    let file = write_file(
        ".properties",
        r"bootstrap.servers=127.0.0.1\:9092
group.id=escaped\u002dgroup
topic=orders
sasl.username=alice
sasl.password=p\=w\\d
",
    );

    let props = Properties::load(file.path()).unwrap();
    let config = ConsumerConfig::from_properties(&props).unwrap();
    assert_eq!(config.bootstrap_servers(), ["127.0.0.1:9092"]);
    assert_eq!(config.group_id(), "escaped-group");
    assert_eq!(config.credentials().unwrap().password(), r"p=w\d");
}

#[test]
fn test_load_toml_file() {
    let file = write_file(
        ".toml",
        r#"
topic = ["orders", "payments"]

[bootstrap]
servers = "127.0.0.1:9092"

[group]
id = "toml-group"

[security]
protocol = "PLAINTEXT"

[poll.timeout]
ms = 250
"#,
    );

    let props = Properties::load(file.path()).unwrap();
    let config = ConsumerConfig::from_properties(&props).unwrap();
    assert_eq!(config.group_id(), "toml-group");
    assert_eq!(config.security_protocol(), SecurityProtocol::Plaintext);
    assert_eq!(config.poll_timeout(), Duration::from_millis(250));
    assert_eq!(config.topics().len(), 2);
}
