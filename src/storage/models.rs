use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::day_bucket_key;

/// 按天分桶的访问计数：key 为当天 UTC 零点的 unix 秒（字符串形式）
pub type UsageBuckets = HashMap<String, i64>;

/// 持久化的短链接记录（两个后端共用同一形状）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortieRecord {
    pub id: String,
    pub url: String,
    /// unix 时间戳，0 表示永不过期
    #[serde(default)]
    pub expiration: i64,
    #[serde(default)]
    pub usage: UsageBuckets,
}

impl ShortieRecord {
    pub fn new(id: impl Into<String>, url: impl Into<String>, expiration: i64) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            expiration,
            usage: UsageBuckets::new(),
        }
    }

    /// 是否已过期（expiration 为 0 时永不过期）
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration > 0 && self.expiration <= now.timestamp()
    }

    /// 为 `now` 所在的日桶加一
    pub fn record_visit(&mut self, now: DateTime<Utc>) {
        *self.usage.entry(day_bucket_key(now)).or_insert(0) += 1;
    }
}

/// `Save` 的结果：首个写入者胜出，未过期的记录不会被改写
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// 新写入（包括替换已过期的记录）
    Created,
    /// 未过期的记录已存在；`url` 为已存储的目标地址
    AlreadyExists { url: String },
}

impl SaveOutcome {
    /// 已存在的记录是否指向另一个 URL（即短 ID 冲突）
    pub fn conflicts_with(&self, url: &str) -> bool {
        matches!(self, SaveOutcome::AlreadyExists { url: existing } if existing != url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_zero_expiration_never_expires() {
        let record = ShortieRecord::new("abc", "http://x.com", 0);
        assert!(!record.is_expired(Utc::now() + Duration::days(10_000)));
    }

    #[test]
    fn test_past_expiration_is_expired() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let record = ShortieRecord::new("abc", "http://x.com", now.timestamp() - 1);
        assert!(record.is_expired(now));

        let record = ShortieRecord::new("abc", "http://x.com", now.timestamp() + 60);
        assert!(!record.is_expired(now));
    }

    #[test]
    fn test_record_visit_uses_day_bucket() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 59).unwrap();
        let mut record = ShortieRecord::new("abc", "http://x.com", 0);
        record.record_visit(now);
        record.record_visit(now);
        assert_eq!(record.usage.len(), 1);
        assert_eq!(record.usage.get("1714521600"), Some(&2));
    }

    #[test]
    fn test_conflicts_with() {
        let same = SaveOutcome::AlreadyExists {
            url: "http://x.com".into(),
        };
        assert!(!same.conflicts_with("http://x.com"));
        assert!(same.conflicts_with("http://y.com"));
        assert!(!SaveOutcome::Created.conflicts_with("http://y.com"));
    }
}
