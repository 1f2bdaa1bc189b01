//! 存储契约与后端
//!
//! 所有后端实现同一个 `Storage` trait（save / get / delete / get_statistics），
//! 后端在启动时由 `StorageFactory` 选定一次，之后不再按请求切换。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::config::{StorageBackend, StorageConfig};
use crate::errors::Result;

pub mod backends;
pub mod models;

pub use backends::{DynamoStorage, DynamoTable, MemoryStorage, ShortieTable};
pub use models::{SaveOutcome, ShortieRecord, UsageBuckets};

/// 存储契约
///
/// 只有后端失败（`StorageOperation` / `Serialization` / `StorageTimeout`）会以
/// `Err` 返回；记录不存在、重复创建都编码在返回值里。
#[async_trait]
pub trait Storage: Send + Sync {
    /// 幂等创建：记录已存在时直接返回成功，不做任何修改
    async fn save(&self, id: &str, url: &str, expiration: i64) -> Result<SaveOutcome>;

    /// 读取目标 URL；命中时为今天的日桶记一次访问
    async fn get(&self, id: &str) -> Result<Option<String>>;

    /// 幂等删除：删除不存在的 id 也是成功
    async fn delete(&self, id: &str) -> Result<()>;

    /// 原始日桶；id 不存在时返回空 map
    async fn get_statistics(&self, id: &str) -> Result<UsageBuckets>;

    fn backend_name(&self) -> &'static str;

    /// 等待在途的后台计数任务，返回超时后仍未完成的数量
    async fn drain(&self, _timeout: Duration) -> usize {
        0
    }
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn Storage>> {
        let backend = config.resolve_backend();
        let storage: Arc<dyn Storage> = match backend {
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
            StorageBackend::Dynamodb => {
                let table = DynamoTable::connect(&config.dynamodb).await?;
                Arc::new(DynamoStorage::new(Arc::new(table)))
            }
        };

        info!("Using storage backend: {}", storage.backend_name());
        Ok(storage)
    }
}
