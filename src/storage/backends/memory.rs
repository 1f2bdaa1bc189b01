//! 进程内存储后端
//!
//! 所有操作共用一把互斥锁，彼此完全串行；`get` 的计数在返回前同步完成，
//! 同一进程内随后的 `get_statistics` 立即可见。进程重启后数据丢失。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::errors::Result;
use crate::storage::{SaveOutcome, ShortieRecord, Storage, UsageBuckets};

#[derive(Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, ShortieRecord>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// 直接累加日桶，不经过 `get` 的计数路径
    ///
    /// 用于在测试中构造跨多天的历史计数；id 不存在时返回 false。
    pub fn merge_usage(&self, id: &str, usage: UsageBuckets) -> bool {
        let mut records = self.records.lock();
        match records.get_mut(id) {
            Some(record) => {
                for (bucket, count) in usage {
                    let slot = record.usage.entry(bucket).or_insert(0);
                    *slot = slot.saturating_add(count);
                }
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save(&self, id: &str, url: &str, expiration: i64) -> Result<SaveOutcome> {
        let mut records = self.records.lock();
        if let Some(existing) = records.get(id) {
            if !existing.is_expired(Utc::now()) {
                trace!("MemoryStorage: {} already exists, keeping first write", id);
                return Ok(SaveOutcome::AlreadyExists {
                    url: existing.url.clone(),
                });
            }
            debug!("MemoryStorage: replacing expired {}", id);
        }

        records.insert(id.to_string(), ShortieRecord::new(id, url, expiration));
        debug!("MemoryStorage: created {}", id);
        Ok(SaveOutcome::Created)
    }

    async fn get(&self, id: &str) -> Result<Option<String>> {
        let mut records = self.records.lock();
        let Some(record) = records.get_mut(id) else {
            return Ok(None);
        };

        let now = Utc::now();
        if record.is_expired(now) {
            trace!("MemoryStorage: {} expired at {}", id, record.expiration);
            return Ok(None);
        }

        record.record_visit(now);
        Ok(Some(record.url.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if self.records.lock().remove(id).is_some() {
            debug!("MemoryStorage: deleted {}", id);
        }
        Ok(())
    }

    async fn get_statistics(&self, id: &str) -> Result<UsageBuckets> {
        Ok(self
            .records
            .lock()
            .get(id)
            .map(|record| record.usage.clone())
            .unwrap_or_default())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
