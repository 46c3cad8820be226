use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use ckafka_sasl_consumer::config::ConsumerConfig;
use ckafka_sasl_consumer::consume::PollLoop;
use ckafka_sasl_consumer::error::InfraResult;
use ckafka_sasl_consumer::kafka::ConsumerSession;
use ckafka_sasl_consumer::runtime::{RuntimeConfig, ServiceRuntime};
use ckafka_sasl_consumer::utils::{DEFAULT_LOG_FILTER, init_tracing};

/// Consume CKafka topics over SASL/PLAIN and print partition/offset of every record
#[derive(Parser, Debug)]
#[command(name = "ckafka-sasl-consumer", version, about)]
struct Args {
    /// Properties file with bootstrap.servers, group.id and topic (a .toml file also works)
    #[arg(short, long, env = "CKAFKA_CONFIG", default_value = "kafka.properties")]
    config: PathBuf,

    /// Override max.poll.records from the properties file
    #[arg(long)]
    max_poll_records: Option<usize>,

    /// Override poll.timeout.ms from the properties file
    #[arg(long)]
    poll_timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> InfraResult<()> {
    init_tracing(DEFAULT_LOG_FILTER);
    let args = Args::parse();

    let mut config = ConsumerConfig::load(&args.config)
        .with_context(|| format!("Failed to load consumer configuration from {}", args.config.display()))?;
    if let Some(max_poll_records) = args.max_poll_records {
        config = config
            .with_max_poll_records(max_poll_records)
            .context("Invalid --max-poll-records")?;
    }
    if let Some(poll_timeout_ms) = args.poll_timeout_ms {
        config = config.with_poll_timeout(Duration::from_millis(poll_timeout_ms));
    }

    let session = ConsumerSession::connect(&config).context("Failed to create Kafka consumer")?;
    info!(topics = ?config.topics(), "Consumer subscribed, polling");

    // 关闭信号在两轮拉取之间才生效，超时需要覆盖一次拉取等待
    let runtime_config = RuntimeConfig::new();
    let shutdown_timeout = runtime_config.shutdown_timeout + config.poll_timeout();

    ServiceRuntime::new_consumer_only("ckafka-sasl-consumer")
        .with_config(runtime_config.with_shutdown_timeout(shutdown_timeout))
        .add_message_consumer("kafka-consumer", Box::new(PollLoop::new(session, std::io::stdout())))
        .run()
        .await
}
