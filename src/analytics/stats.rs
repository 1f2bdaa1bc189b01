use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::UsageBuckets;

const SECONDS_PER_DAY: i64 = 86_400;

/// 滑动周窗口包含的天数（含今天）
pub const WEEK_WINDOW_DAYS: i64 = 7;

/// 将时间截断到当天 UTC 零点
pub fn day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = now.timestamp().div_euclid(SECONDS_PER_DAY) * SECONDS_PER_DAY;
    Utc.timestamp_opt(midnight, 0).single().unwrap_or(now)
}

/// 日桶 key：当天 UTC 零点的 unix 秒，字符串形式
///
/// 写入与读取必须使用同一推导，否则聚合会静默多算或少算。
pub fn day_bucket_key(now: DateTime<Utc>) -> String {
    day_start(now).timestamp().to_string()
}

/// 聚合后的访问统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub last_day: i64,
    pub last_week: i64,
    pub all_time: i64,
}

impl UsageStats {
    /// 从原始日桶计算统计
    ///
    /// - `last_day`: 今天的桶
    /// - `last_week`: 今天及之前 6 天的桶，更早的桶即使存在也不计入
    /// - `all_time`: 所有桶之和，与时间无关
    pub fn aggregate(usage: &UsageBuckets, now: DateTime<Utc>) -> Self {
        let today = day_start(now);
        let bucket = |days_ago: i64| {
            let key = day_bucket_key(today - Duration::days(days_ago));
            usage.get(&key).copied().unwrap_or(0)
        };

        let last_day = bucket(0);
        let last_week = (0..WEEK_WINDOW_DAYS)
            .map(bucket)
            .fold(0i64, |acc, count| acc.saturating_add(count));
        let all_time = usage
            .values()
            .fold(0i64, |acc, count| acc.saturating_add(*count));

        Self {
            last_day,
            last_week,
            all_time,
        }
    }
}
