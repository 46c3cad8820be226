//! 消费者配置加载
//!
//! 从 properties 文件（可选环境变量覆盖）构建不可变的 [`ConsumerConfig`]。
//! 加载过程不会发起任何网络调用，必填项缺失会在这里直接失败。

pub mod jaas;
pub mod properties;

pub use properties::Properties;

use crate::error::ConfigError;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub const KEY_BOOTSTRAP_SERVERS: &str = "bootstrap.servers";
pub const KEY_GROUP_ID: &str = "group.id";
pub const KEY_TOPIC: &str = "topic";
pub const KEY_SECURITY_PROTOCOL: &str = "security.protocol";
pub const KEY_SASL_MECHANISM: &str = "sasl.mechanism";
pub const KEY_SASL_USERNAME: &str = "sasl.username";
pub const KEY_SASL_PASSWORD: &str = "sasl.password";
pub const KEY_INSTANCE_ID: &str = "instance.id";
pub const KEY_JAAS_CONFIG: &str = "java.security.auth.login.config";
pub const KEY_SESSION_TIMEOUT_MS: &str = "session.timeout.ms";
pub const KEY_MAX_POLL_RECORDS: &str = "max.poll.records";
pub const KEY_POLL_TIMEOUT_MS: &str = "poll.timeout.ms";
pub const KEY_AUTO_OFFSET_RESET: &str = "auto.offset.reset";
pub const KEY_CLIENT_ID: &str = "client.id";

/// 两次拉取之间允许的最大心跳间隔，超时后服务端会把消费者移出消费组并触发 rebalance
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_millis(30_000);
/// 每次拉取的最大消息数，过大时来不及在下次拉取前处理完会触发 rebalance
pub const DEFAULT_MAX_POLL_RECORDS: usize = 30;
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(1_000);
pub const DEFAULT_AUTO_OFFSET_RESET: &str = "latest";

/// 接入协议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityProtocol {
    Plaintext,
    Ssl,
    #[default]
    SaslPlaintext,
    SaslSsl,
}

impl SecurityProtocol {
    /// librdkafka 使用的名称
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityProtocol::Plaintext => "plaintext",
            SecurityProtocol::Ssl => "ssl",
            SecurityProtocol::SaslPlaintext => "sasl_plaintext",
            SecurityProtocol::SaslSsl => "sasl_ssl",
        }
    }

    pub fn uses_sasl(&self) -> bool {
        matches!(self, SecurityProtocol::SaslPlaintext | SecurityProtocol::SaslSsl)
    }
}

impl fmt::Display for SecurityProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

impl FromStr for SecurityProtocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plaintext" => Ok(SecurityProtocol::Plaintext),
            "ssl" => Ok(SecurityProtocol::Ssl),
            "sasl_plaintext" => Ok(SecurityProtocol::SaslPlaintext),
            "sasl_ssl" => Ok(SecurityProtocol::SaslSsl),
            _ => Err(ConfigError::invalid(
                KEY_SECURITY_PROTOCOL,
                s,
                "expected PLAINTEXT, SSL, SASL_PLAINTEXT or SASL_SSL",
            )),
        }
    }
}

/// SASL 认证机制
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaslMechanism {
    #[default]
    Plain,
    ScramSha256,
    ScramSha512,
}

impl SaslMechanism {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaslMechanism::Plain => "PLAIN",
            SaslMechanism::ScramSha256 => "SCRAM-SHA-256",
            SaslMechanism::ScramSha512 => "SCRAM-SHA-512",
        }
    }
}

impl fmt::Display for SaslMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaslMechanism {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PLAIN" => Ok(SaslMechanism::Plain),
            "SCRAM-SHA-256" => Ok(SaslMechanism::ScramSha256),
            "SCRAM-SHA-512" => Ok(SaslMechanism::ScramSha512),
            _ => Err(ConfigError::invalid(
                KEY_SASL_MECHANISM,
                s,
                "expected PLAIN, SCRAM-SHA-256 or SCRAM-SHA-512",
            )),
        }
    }
}

/// SASL 用户名密码
#[derive(Clone, PartialEq, Eq)]
pub struct SaslCredentials {
    username: String,
    password: String,
}

impl SaslCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// 托管服务要求用户名写成 `<实例ID>#<用户名>`，已带 `#` 的保持不变
    fn with_instance(self, instance_id: Option<&str>) -> Self {
        match instance_id {
            Some(instance) if !self.username.contains('#') => Self {
                username: format!("{instance}#{}", self.username),
                password: self.password,
            },
            _ => self,
        }
    }
}

impl fmt::Debug for SaslCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaslCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// 消费者配置，构建后不可变
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    bootstrap_servers: Vec<String>,
    security_protocol: SecurityProtocol,
    sasl_mechanism: SaslMechanism,
    credentials: Option<SaslCredentials>,
    session_timeout: Duration,
    max_poll_records: usize,
    poll_timeout: Duration,
    auto_offset_reset: String,
    client_id: Option<String>,
    group_id: String,
    topics: BTreeSet<String>,
}

impl ConsumerConfig {
    /// 从文件加载并应用 `CKAFKA_*` 环境变量覆盖
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut props = Properties::load(path)?;
        props.apply_process_env();

        let config = Self::from_properties(&props)?;
        info!(
            path = %path.display(),
            bootstrap = %config.bootstrap_servers.join(","),
            group_id = %config.group_id,
            topics = ?config.topics,
            security_protocol = %config.security_protocol,
            "Consumer configuration loaded"
        );
        Ok(config)
    }

    /// 从键值集合构建配置
    pub fn from_properties(props: &Properties) -> Result<Self, ConfigError> {
        let bootstrap_servers = parse_bootstrap_servers(require(props, KEY_BOOTSTRAP_SERVERS)?)?;
        let group_id = require(props, KEY_GROUP_ID)?.to_string();
        let topics = parse_topics(require(props, KEY_TOPIC)?);
        if topics.is_empty() {
            return Err(ConfigError::EmptyTopics);
        }

        let security_protocol = props
            .get(KEY_SECURITY_PROTOCOL)
            .map(str::parse::<SecurityProtocol>)
            .transpose()?
            .unwrap_or_default();
        let sasl_mechanism = props
            .get(KEY_SASL_MECHANISM)
            .map(str::parse::<SaslMechanism>)
            .transpose()?
            .unwrap_or_default();

        let credentials = resolve_credentials(props)?;
        if security_protocol.uses_sasl() && credentials.is_none() {
            return Err(ConfigError::MissingCredentials(security_protocol.to_string()));
        }

        let session_timeout = parse_number::<u64>(props, KEY_SESSION_TIMEOUT_MS)?
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_SESSION_TIMEOUT);
        let poll_timeout = parse_number::<u64>(props, KEY_POLL_TIMEOUT_MS)?
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_TIMEOUT);
        let max_poll_records = match parse_number::<usize>(props, KEY_MAX_POLL_RECORDS)? {
            Some(n) => check_max_poll_records(n)?,
            None => DEFAULT_MAX_POLL_RECORDS,
        };

        let auto_offset_reset = props
            .get(KEY_AUTO_OFFSET_RESET)
            .unwrap_or(DEFAULT_AUTO_OFFSET_RESET)
            .to_string();

        Ok(Self {
            bootstrap_servers,
            security_protocol,
            sasl_mechanism,
            credentials,
            session_timeout,
            max_poll_records,
            poll_timeout,
            auto_offset_reset,
            client_id: props.get(KEY_CLIENT_ID).map(str::to_string),
            group_id,
            topics,
        })
    }

    /// 覆盖单次拉取的最大消息数（命令行参数优先于文件），0 与文件中一样被拒绝
    pub fn with_max_poll_records(mut self, max_poll_records: usize) -> Result<Self, ConfigError> {
        self.max_poll_records = check_max_poll_records(max_poll_records)?;
        Ok(self)
    }

    /// 覆盖单次拉取的等待时间
    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    pub fn bootstrap_servers(&self) -> &[String] {
        &self.bootstrap_servers
    }

    pub fn security_protocol(&self) -> SecurityProtocol {
        self.security_protocol
    }

    pub fn sasl_mechanism(&self) -> SaslMechanism {
        self.sasl_mechanism
    }

    pub fn credentials(&self) -> Option<&SaslCredentials> {
        self.credentials.as_ref()
    }

    pub fn session_timeout(&self) -> Duration {
        self.session_timeout
    }

    pub fn max_poll_records(&self) -> usize {
        self.max_poll_records
    }

    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    pub fn auto_offset_reset(&self) -> &str {
        &self.auto_offset_reset
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn topics(&self) -> &BTreeSet<String> {
        &self.topics
    }
}

/// 拆分逗号分隔的 topic 列表，去掉空白和空项
pub fn parse_topics(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bootstrap_servers(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut servers = Vec::new();
    for endpoint in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let valid = endpoint
            .rsplit_once(':')
            .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
        if !valid {
            return Err(ConfigError::invalid(
                KEY_BOOTSTRAP_SERVERS,
                endpoint,
                "expected host:port",
            ));
        }
        servers.push(endpoint.to_string());
    }

    if servers.is_empty() {
        return Err(ConfigError::MissingKey(KEY_BOOTSTRAP_SERVERS));
    }
    Ok(servers)
}

fn check_max_poll_records(n: usize) -> Result<usize, ConfigError> {
    if n == 0 {
        return Err(ConfigError::invalid(KEY_MAX_POLL_RECORDS, "0", "must be at least 1"));
    }
    Ok(n)
}

fn require<'a>(props: &'a Properties, key: &'static str) -> Result<&'a str, ConfigError> {
    props.get(key).ok_or(ConfigError::MissingKey(key))
}

fn parse_number<T: FromStr>(props: &Properties, key: &str) -> Result<Option<T>, ConfigError> {
    props
        .get(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| ConfigError::invalid(key, raw, "expected a non-negative integer"))
        })
        .transpose()
}

/// 凭证来源：properties 中的 sasl.username/sasl.password，其次是 JAAS 文件
fn resolve_credentials(props: &Properties) -> Result<Option<SaslCredentials>, ConfigError> {
    let instance_id = props.get(KEY_INSTANCE_ID);

    let credentials = match (props.get(KEY_SASL_USERNAME), props.get(KEY_SASL_PASSWORD)) {
        (Some(username), Some(password)) => Some(SaslCredentials::new(username, password)),
        (Some(_), None) => return Err(ConfigError::MissingKey(KEY_SASL_PASSWORD)),
        (None, Some(_)) => return Err(ConfigError::MissingKey(KEY_SASL_USERNAME)),
        (None, None) => match props.get(KEY_JAAS_CONFIG) {
            Some(path) => Some(jaas::load_plain_credentials(path)?),
            None => None,
        },
    };

    Ok(credentials.map(|creds| creds.with_instance(instance_id)))
}
