//! 远程（DynamoDB）存储后端
//!
//! - `save`: 条件写入（主键不存在或现有记录已过期），条件失败视为成功
//! - `get`: 点读后立即返回 URL，再派发一个不等待的后台任务，
//!   在读到的记录上为今天的日桶加一并整条覆盖写回
//! - `delete`: 按主键无条件删除
//! - `get_statistics`: 点读，原样返回日桶
//!
//! 计数不是原子的：并发的 `get` 可能都读到 N 并都写回 N+1，丢失一次计数。
//! 这是尽力而为统计可接受的取舍。后台任务失败只记日志，不会传给调用方。

mod converters;
mod table;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

use crate::analytics::PendingTasks;
use crate::errors::{Result, ShortieError};
use crate::storage::{SaveOutcome, ShortieRecord, Storage, UsageBuckets};

pub use table::DynamoTable;

/// 按主键寻址的表操作
#[async_trait]
pub trait ShortieTable: Send + Sync {
    /// 仅当主键不存在、或现有记录在 `now` 时已过期时写入；条件不满足返回 `Ok(false)`
    async fn put_if_vacant(&self, record: &ShortieRecord, now: i64) -> Result<bool>;

    /// 整条覆盖写入
    async fn put(&self, record: &ShortieRecord) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<ShortieRecord>>;

    async fn delete(&self, id: &str) -> Result<()>;
}

/// 条件写入与回读之间记录被并发删除或过期时的重试次数
const SAVE_ATTEMPTS: usize = 3;

pub struct DynamoStorage {
    table: Arc<dyn ShortieTable>,
    pending: PendingTasks,
    /// 后台计数任务所在的 runtime（不依赖请求所在的 worker）
    runtime: Handle,
}

impl DynamoStorage {
    /// 使用当前 runtime 派发后台任务，必须在 tokio 上下文中调用
    pub fn new(table: Arc<dyn ShortieTable>) -> Self {
        Self {
            table,
            pending: PendingTasks::new(),
            runtime: Handle::current(),
        }
    }

    #[cfg(test)]
    fn pending_increments(&self) -> usize {
        self.pending.pending()
    }

    fn spawn_increment(&self, mut record: ShortieRecord) {
        let table = self.table.clone();
        self.pending.spawn(&self.runtime, async move {
            record.record_visit(Utc::now());
            match table.put(&record).await {
                Ok(()) => trace!("DynamoStorage: usage incremented for {}", record.id),
                Err(e) => warn!("failed to increment usage for {}: {}", record.id, e),
            }
        });
    }
}

#[async_trait]
impl Storage for DynamoStorage {
    async fn save(&self, id: &str, url: &str, expiration: i64) -> Result<SaveOutcome> {
        let record = ShortieRecord::new(id, url, expiration);

        for _ in 0..SAVE_ATTEMPTS {
            if self
                .table
                .put_if_vacant(&record, Utc::now().timestamp())
                .await?
            {
                debug!("DynamoStorage: created {}", id);
                return Ok(SaveOutcome::Created);
            }

            // 条件写入失败：读取现值用于冲突判断，读失败直接返回给调用方
            match self.table.get(id).await? {
                Some(existing) if !existing.is_expired(Utc::now()) => {
                    trace!("DynamoStorage: {} already exists, keeping first write", id);
                    return Ok(SaveOutcome::AlreadyExists { url: existing.url });
                }
                _ => debug!("DynamoStorage: {} changed during save, retrying", id),
            }
        }

        Err(ShortieError::storage_operation(format!(
            "failed to save a url: {} kept changing during {} attempts",
            id, SAVE_ATTEMPTS
        )))
    }

    async fn get(&self, id: &str) -> Result<Option<String>> {
        let Some(record) = self.table.get(id).await? else {
            return Ok(None);
        };

        if record.is_expired(Utc::now()) {
            trace!("DynamoStorage: {} expired at {}", id, record.expiration);
            return Ok(None);
        }

        let url = record.url.clone();
        self.spawn_increment(record);
        Ok(Some(url))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.table.delete(id).await
    }

    async fn get_statistics(&self, id: &str) -> Result<UsageBuckets> {
        Ok(self
            .table
            .get(id)
            .await?
            .map(|record| record.usage)
            .unwrap_or_default())
    }

    fn backend_name(&self) -> &'static str {
        "dynamodb"
    }

    async fn drain(&self, timeout: Duration) -> usize {
        self.pending.wait_idle(timeout).await
    }
}
