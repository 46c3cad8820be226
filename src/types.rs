use std::fmt;

/// 一条消费到的消息
///
/// 只读，由 Kafka 客户端产生，这里只用于输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: String,
    pub value: String,
}

impl Record {
    pub fn new(
        topic: impl Into<String>,
        partition: i32,
        offset: i64,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Record {
    /// 输出格式：`Consume partition:<p> offset:<o>`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Consume partition:{} offset:{}", self.partition, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_line() {
        let record = Record::new("orders", 3, 42, "k", "v");
        assert_eq!(record.to_string(), "Consume partition:3 offset:42");
    }
}
