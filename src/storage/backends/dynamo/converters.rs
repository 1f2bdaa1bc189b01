use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue as Av;

use crate::errors::{Result, ShortieError};
use crate::storage::{ShortieRecord, UsageBuckets};

pub const ATTR_SHORT_ID: &str = "shortID";
pub const ATTR_URL: &str = "url";
pub const ATTR_VERSION: &str = "version";
pub const ATTR_EXPIRATION: &str = "expiration";
pub const ATTR_USAGE: &str = "usage";

/// 将 ShortieRecord 转换为 DynamoDB item
pub fn record_to_item(record: &ShortieRecord) -> HashMap<String, Av> {
    let usage = record
        .usage
        .iter()
        .map(|(bucket, count)| (bucket.clone(), Av::N(count.to_string())))
        .collect();

    HashMap::from([
        (ATTR_SHORT_ID.to_string(), Av::S(record.id.clone())),
        (ATTR_URL.to_string(), Av::S(record.url.clone())),
        (ATTR_VERSION.to_string(), Av::N("0".to_string())),
        (ATTR_EXPIRATION.to_string(), Av::N(record.expiration.to_string())),
        (ATTR_USAGE.to_string(), Av::M(usage)),
    ])
}

/// 将 DynamoDB item 转换为 ShortieRecord
///
/// 缺失的 `usage` 视为空 map，缺失的 `expiration` 视为 0
pub fn item_to_record(item: &HashMap<String, Av>) -> Result<ShortieRecord> {
    let id = string_attr(item, ATTR_SHORT_ID)?;
    let url = string_attr(item, ATTR_URL)?;

    let expiration = match item.get(ATTR_EXPIRATION) {
        None | Some(Av::Null(_)) => 0,
        Some(value) => number_attr(value, ATTR_EXPIRATION)?,
    };

    let usage = match item.get(ATTR_USAGE) {
        None | Some(Av::Null(_)) => UsageBuckets::new(),
        Some(Av::M(buckets)) => buckets
            .iter()
            .map(|(bucket, count)| Ok((bucket.clone(), number_attr(count, bucket)?)))
            .collect::<Result<UsageBuckets>>()?,
        Some(_) => {
            return Err(ShortieError::serialization(format!(
                "failed to deserialize url object: attribute '{}' is not a map",
                ATTR_USAGE
            )));
        }
    };

    Ok(ShortieRecord {
        id,
        url,
        expiration,
        usage,
    })
}

fn string_attr(item: &HashMap<String, Av>, name: &str) -> Result<String> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| {
            ShortieError::serialization(format!(
                "failed to deserialize url object: missing string attribute '{}'",
                name
            ))
        })
}

fn number_attr(value: &Av, name: &str) -> Result<i64> {
    value
        .as_n()
        .ok()
        .and_then(|n| n.parse::<i64>().ok())
        .ok_or_else(|| {
            ShortieError::serialization(format!(
                "failed to deserialize url object: attribute '{}' is not an integer",
                name
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ShortieRecord {
        let mut record = ShortieRecord::new("4e24c46962", "https://example.com/data/hi", 0);
        record.usage.insert("1714521600".to_string(), 3);
        record.usage.insert("1714608000".to_string(), 1);
        record
    }

    #[test]
    fn test_record_to_item_layout() {
        let item = record_to_item(&sample_record());
        assert_eq!(item.get(ATTR_SHORT_ID), Some(&Av::S("4e24c46962".into())));
        assert_eq!(item.get(ATTR_VERSION), Some(&Av::N("0".into())));
        assert_eq!(item.get(ATTR_EXPIRATION), Some(&Av::N("0".into())));
        let usage = item.get(ATTR_USAGE).and_then(|v| v.as_m().ok()).unwrap();
        assert_eq!(usage.get("1714521600"), Some(&Av::N("3".into())));
    }

    #[test]
    fn test_item_to_record_restores_record() {
        let record = sample_record();
        let restored = item_to_record(&record_to_item(&record)).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_missing_usage_is_empty() {
        let item = HashMap::from([
            (ATTR_SHORT_ID.to_string(), Av::S("abc".into())),
            (ATTR_URL.to_string(), Av::S("http://x.com".into())),
        ]);
        let record = item_to_record(&item).unwrap();
        assert!(record.usage.is_empty());
        assert_eq!(record.expiration, 0);
    }

    #[test]
    fn test_missing_url_is_serialization_error() {
        let item = HashMap::from([(ATTR_SHORT_ID.to_string(), Av::S("abc".into()))]);
        let err = item_to_record(&item).unwrap_err();
        assert!(matches!(err, ShortieError::Serialization(_)));
    }

    #[test]
    fn test_bad_usage_count_is_serialization_error() {
        let item = HashMap::from([
            (ATTR_SHORT_ID.to_string(), Av::S("abc".into())),
            (ATTR_URL.to_string(), Av::S("http://x.com".into())),
            (
                ATTR_USAGE.to_string(),
                Av::M(HashMap::from([("1714521600".to_string(), Av::S("x".into()))])),
            ),
        ]);
        assert!(item_to_record(&item).is_err());
    }
}
