//! JAAS 登录配置解析
//!
//! 托管服务的 Java 接入示例把 PLAIN 用户名密码放在 JAAS 文件里：
//!
//! ```text
//! KafkaClient {
//!   org.apache.kafka.common.security.plain.PlainLoginModule required
//!   username="ckafka-xxxx#user"
//!   password="secret";
//! };
//! ```

use super::SaslCredentials;
use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;

const PLAIN_LOGIN_MODULE: &str = "PlainLoginModule";

/// 读取 JAAS 文件并提取 PLAIN 凭证
pub fn load_plain_credentials(path: impl AsRef<Path>) -> Result<SaslCredentials, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_plain_credentials(&content)
}

/// 从 JAAS 文本中提取 PLAIN 凭证
pub fn parse_plain_credentials(text: &str) -> Result<SaslCredentials, ConfigError> {
    let start = text
        .find(PLAIN_LOGIN_MODULE)
        .ok_or_else(|| ConfigError::Jaas(format!("no {PLAIN_LOGIN_MODULE} entry found")))?;
    let options = parse_options(&text[start + PLAIN_LOGIN_MODULE.len()..])?;
    let username = options
        .get("username")
        .ok_or_else(|| ConfigError::Jaas("missing `username` option".into()))?;
    let password = options
        .get("password")
        .ok_or_else(|| ConfigError::Jaas("missing `password` option".into()))?;

    Ok(SaslCredentials::new(username.clone(), password.clone()))
}

/// 解析 `name="value"` 形式的选项直到条目结尾的 `;`，控制标志（required 等）直接跳过
///
/// 引号内的 `;` 属于值本身
fn parse_options(body: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut options = HashMap::new();
    let mut rest = body;

    loop {
        let stop = rest
            .find(['=', ';'])
            .ok_or_else(|| ConfigError::Jaas("login module entry is not terminated by `;`".into()))?;
        if rest[stop..].starts_with(';') {
            return Ok(options);
        }

        let name = rest[..stop]
            .split_whitespace()
            .last()
            .ok_or_else(|| ConfigError::Jaas("option without a name".into()))?
            .to_string();

        let after = rest[stop + 1..].trim_start();
        let (value, remaining) = match after.strip_prefix('"') {
            Some(quoted) => {
                let close = quoted
                    .find('"')
                    .ok_or_else(|| ConfigError::Jaas(format!("unterminated value for `{name}`")))?;
                (&quoted[..close], &quoted[close + 1..])
            }
            None => {
                let end = after
                    .find(|c: char| c.is_whitespace() || c == ';')
                    .unwrap_or(after.len());
                (&after[..end], &after[end..])
            }
        };

        options.insert(name, value.to_string());
        rest = remaining;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
KafkaClient {
  org.apache.kafka.common.security.plain.PlainLoginModule required
  username="ckafka-80o10xqp#alice"
  password="p@ss=word";
};
"#;

    #[test]
    fn test_parse_plain_credentials() {
        let creds = parse_plain_credentials(SAMPLE).unwrap();
        assert_eq!(creds.username(), "ckafka-80o10xqp#alice");
        assert_eq!(creds.password(), "p@ss=word");
    }

    #[test]
    fn test_missing_login_module() {
        let err = parse_plain_credentials("KafkaClient { };").unwrap_err();
        assert!(matches!(err, ConfigError::Jaas(_)));
    }

    #[test]
    fn test_missing_password() {
        let text = "x.PlainLoginModule required username=\"bob\";";
        let err = parse_plain_credentials(text).unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn test_semicolon_inside_quoted_value() {
        let text = "KafkaClient {\n  x.PlainLoginModule required\n  username=\"bob\"\n  password=\"ab;cd\";\n};";
        let creds = parse_plain_credentials(text).unwrap();
        assert_eq!(creds.username(), "bob");
        assert_eq!(creds.password(), "ab;cd");
    }

    #[test]
    fn test_unquoted_value_before_terminator() {
        let creds = parse_plain_credentials("x.PlainLoginModule required username=bob password=pw;").unwrap();
        assert_eq!(creds.username(), "bob");
        assert_eq!(creds.password(), "pw");
    }

    #[test]
    fn test_missing_terminator() {
        let err = parse_plain_credentials("x.PlainLoginModule required username=\"bob\" password=\"pw\"").unwrap_err();
        assert!(err.to_string().contains("not terminated"));
    }
}
