//! Java 风格 properties 文件解析
//!
//! 支持 `key=value`、`key:value`、`key value` 三种分隔方式，
//! `#`/`!` 开头的注释行，行尾 `\` 续行，以及键和值中的 `\` 转义
//! （`\\`、`\=`、`\:`、`\t`、`\uXXXX` 等）。
//! 以 `.toml` 结尾的文件按 TOML 读取，嵌套表展开成点分键。

use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// 环境变量与配置项的对应关系
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("CKAFKA_BOOTSTRAP_SERVERS", "bootstrap.servers"),
    ("CKAFKA_GROUP_ID", "group.id"),
    ("CKAFKA_TOPIC", "topic"),
    ("CKAFKA_SASL_USERNAME", "sasl.username"),
    ("CKAFKA_SASL_PASSWORD", "sasl.password"),
];

/// 键值配置集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从文件加载，按扩展名选择格式
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let props = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&content)?,
            _ => Self::parse(&content),
        };

        debug!(path = %path.display(), keys = props.len(), "Loaded consumer properties");
        Ok(props)
    }

    /// 解析 properties 文本，后出现的重复键覆盖前面的
    pub fn parse(text: &str) -> Self {
        let mut props = Self::new();
        let mut pending = String::new();

        for raw in text.lines() {
            let line = raw.trim_start();
            if pending.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
                continue;
            }

            // 奇数个结尾反斜杠表示续行
            let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
            if trailing % 2 == 1 {
                pending.push_str(&line[..line.len() - 1]);
                continue;
            }

            pending.push_str(line);
            if let Some((key, value)) = split_entry(&pending) {
                props.set(key, value);
            }
            pending.clear();
        }

        if let Some((key, value)) = split_entry(&pending) {
            props.set(key, value);
        }

        props
    }

    /// 解析 TOML 文本
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(text)?;
        let mut props = Self::new();
        flatten_table(&mut props, None, &table);
        Ok(props)
    }

    /// 读取配置值，空白值视为不存在
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 用环境变量覆盖配置项
    ///
    /// `lookup` 通常是 `std::env::var`，测试中可以传入固定的映射
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (var, key) in ENV_OVERRIDES {
            if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
                debug!(env = %var, property = %key, "Property overridden from environment");
                self.set(*key, value);
            }
        }
    }

    /// 用当前进程的环境变量覆盖配置项
    pub fn apply_process_env(&mut self) {
        self.apply_env_overrides(|var| std::env::var(var).ok());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Self::new();
        for (key, value) in iter {
            props.set(key, value);
        }
        props
    }
}

/// 拆出键和值，键在第一个未转义的 `=`、`:` 或空白处结束
fn split_entry(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut key_end = line.len();
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || c.is_whitespace() {
            key_end = idx;
            break;
        }
    }
    let (key, rest) = line.split_at(key_end);

    // 分隔符两侧允许空白，`key = value` 与 `key value` 都合法
    let rest = rest.trim_start();
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);

    Some((unescape(key), unescape(rest.trim_start())))
}

/// 解码反斜杠转义，无法识别的 `\uXXXX` 原样保留 `u`
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                let decoded = (hex.len() == 4 && hex.chars().all(|h| h.is_ascii_hexdigit()))
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(decoded) => {
                        out.push(decoded);
                        chars.nth(3);
                    }
                    _ => out.push('u'),
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}

fn flatten_table(props: &mut Properties, prefix: Option<&str>, table: &toml::Table) {
    for (name, value) in table {
        let key = match prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.clone(),
        };

        match value {
            toml::Value::Table(inner) => flatten_table(props, Some(&key), inner),
            toml::Value::String(s) => props.set(key, s.clone()),
            toml::Value::Array(items) => {
                let joined = items
                    .iter()
                    .map(|item| match item {
                        toml::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                props.set(key, joined);
            }
            other => props.set(key, other.to_string()),
        }
    }
}
