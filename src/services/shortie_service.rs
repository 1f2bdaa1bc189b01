//! 短链服务
//!
//! HTTP 处理器调用的业务逻辑：短 ID 生成与冲突扩展、带超时的存储调用、
//! 访问统计聚合。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::analytics::UsageStats;
use crate::config::{IdConfig, StaticConfig};
use crate::errors::{Result, ShortieError};
use crate::storage::{SaveOutcome, Storage};
use crate::utils::generate_short_id;

/// 服务需要的静态配置项
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub public_base_url: String,
    pub id: IdConfig,
    pub operation_timeout: Duration,
}

impl ServiceSettings {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            public_base_url: config.server.public_base_url.clone(),
            id: config.id.clone(),
            operation_timeout: Duration::from_millis(config.storage.operation_timeout_ms),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&StaticConfig::default())
    }
}

/// 创建结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedShortie {
    pub id: String,
    pub short_url: String,
    /// 同一 URL 已存在于该 id 时为 false
    pub newly_created: bool,
}

pub struct ShortieService {
    storage: Arc<dyn Storage>,
    settings: ServiceSettings,
}

impl ShortieService {
    pub fn new(storage: Arc<dyn Storage>, settings: ServiceSettings) -> Self {
        Self { storage, settings }
    }

    pub fn short_url(&self, id: &str) -> String {
        format!(
            "{}/shortie/{}",
            self.settings.public_base_url.trim_end_matches('/'),
            id
        )
    }

    /// 为存储调用的同步部分加超时
    async fn bounded<T>(&self, op: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.settings.operation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Storage {} timed out after {:?}",
                    op, self.settings.operation_timeout
                );
                Err(ShortieError::storage_timeout(format!(
                    "{} timed out after {}ms",
                    op,
                    self.settings.operation_timeout.as_millis()
                )))
            }
        }
    }

    /// 为 `url` 创建（或重新创建）映射
    ///
    /// id 取 URL 哈希的前缀。该 id 已被其它 URL 占用时，前缀每次增加
    /// `extend_step` 个字符，直到找到空闲或相同 URL 的 id；超过 `max_length`
    /// 时返回 `IdSpaceExhausted`。
    pub async fn create(&self, url: &str, expiration: i64) -> Result<CreatedShortie> {
        let id_config = &self.settings.id;
        let mut length = id_config.length;

        loop {
            let id = generate_short_id(url, length);
            let outcome = self
                .bounded("save", self.storage.save(&id, url, expiration))
                .await?;

            if !outcome.conflicts_with(url) {
                let newly_created = outcome == SaveOutcome::Created;
                if newly_created {
                    info!("ShortieService: created '{}' -> '{}'", id, url);
                }
                return Ok(CreatedShortie {
                    short_url: self.short_url(&id),
                    id,
                    newly_created,
                });
            }

            warn!(
                "ShortieService: id '{}' already maps to a different url, extending",
                id
            );
            if length >= id_config.max_length {
                return Err(ShortieError::id_space_exhausted(format!(
                    "no free identifier for '{}' up to length {}",
                    url, id_config.max_length
                )));
            }
            length = (length + id_config.extend_step).min(id_config.max_length);
        }
    }

    /// 解析 id 的目标地址；命中时记一次访问
    pub async fn resolve(&self, id: &str) -> Result<Option<String>> {
        self.bounded("get", self.storage.get(id)).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.bounded("delete", self.storage.delete(id)).await?;
        info!("ShortieService: deleted '{}'", id);
        Ok(())
    }

    pub async fn stats(&self, id: &str) -> Result<UsageStats> {
        self.stats_at(id, Utc::now()).await
    }

    pub async fn stats_at(&self, id: &str, now: DateTime<Utc>) -> Result<UsageStats> {
        let usage = self
            .bounded("get_statistics", self.storage.get_statistics(id))
            .await?;
        Ok(UsageStats::aggregate(&usage, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, UsageBuckets};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;

    const URL: &str = "https://example.com/data/hi";

    fn service(storage: Arc<dyn Storage>) -> ShortieService {
        ShortieService::new(storage, ServiceSettings::default())
    }

    /// 在 `taken` 里的 id 一律视为被别的 URL 占用
    struct Occupied {
        taken: Vec<String>,
        inner: MemoryStorage,
    }

    #[async_trait]
    impl Storage for Occupied {
        async fn save(&self, id: &str, url: &str, expiration: i64) -> Result<SaveOutcome> {
            if self.taken.iter().any(|t| t == id) {
                return Ok(SaveOutcome::AlreadyExists {
                    url: "https://other.example/".to_string(),
                });
            }
            self.inner.save(id, url, expiration).await
        }

        async fn get(&self, id: &str) -> Result<Option<String>> {
            self.inner.get(id).await
        }

        async fn delete(&self, id: &str) -> Result<()> {
            self.inner.delete(id).await
        }

        async fn get_statistics(&self, id: &str) -> Result<UsageBuckets> {
            self.inner.get_statistics(id).await
        }

        fn backend_name(&self) -> &'static str {
            "occupied"
        }
    }

    struct Stalled;

    #[async_trait]
    impl Storage for Stalled {
        async fn save(&self, _: &str, _: &str, _: i64) -> Result<SaveOutcome> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(SaveOutcome::Created)
        }

        async fn get(&self, _: &str) -> Result<Option<String>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }

        async fn delete(&self, _: &str) -> Result<()> {
            Ok(())
        }

        async fn get_statistics(&self, _: &str) -> Result<UsageBuckets> {
            Ok(HashMap::new())
        }

        fn backend_name(&self) -> &'static str {
            "stalled"
        }
    }

    #[tokio::test]
    async fn test_create_uses_hash_prefix() {
        let svc = service(Arc::new(MemoryStorage::new()));
        let created = svc.create(URL, 0).await.unwrap();
        assert_eq!(created.id, "4e24c46962");
        assert_eq!(created.short_url, "http://localhost:8421/shortie/4e24c46962");
        assert!(created.newly_created);

        let again = svc.create(URL, 0).await.unwrap();
        assert_eq!(again.id, created.id);
        assert!(!again.newly_created);
    }

    #[tokio::test]
    async fn test_collision_extends_id() {
        let storage = Arc::new(Occupied {
            taken: vec![generate_short_id(URL, 10)],
            inner: MemoryStorage::new(),
        });
        let svc = service(storage);
        let created = svc.create(URL, 0).await.unwrap();
        assert_eq!(created.id, generate_short_id(URL, 12));
        assert!(created.id.starts_with("4e24c46962"));
        assert_eq!(svc.resolve(&created.id).await.unwrap().as_deref(), Some(URL));
    }

    #[tokio::test]
    async fn test_collision_exhaustion() {
        let taken = (1..=32).map(|n| generate_short_id(URL, n)).collect();
        let svc = service(Arc::new(Occupied {
            taken,
            inner: MemoryStorage::new(),
        }));
        let err = svc.create(URL, 0).await.unwrap_err();
        assert!(matches!(err, ShortieError::IdSpaceExhausted(_)));
    }

    #[tokio::test]
    async fn test_storage_calls_are_bounded() {
        let settings = ServiceSettings {
            operation_timeout: Duration::from_millis(20),
            ..ServiceSettings::default()
        };
        let svc = ShortieService::new(Arc::new(Stalled), settings);
        let err = svc.create(URL, 0).await.unwrap_err();
        assert!(matches!(err, ShortieError::StorageTimeout(_)));
        let err = svc.resolve("abc").await.unwrap_err();
        assert!(err.is_backend_failure());
    }

    #[tokio::test]
    async fn test_stats_aggregates_buckets() {
        let storage = Arc::new(MemoryStorage::new());
        let svc = service(storage.clone());
        let created = svc.create(URL, 0).await.unwrap();

        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let mut usage = UsageBuckets::new();
        usage.insert("1715299200".to_string(), 2); // 2024-05-10
        usage.insert("1714867200".to_string(), 5); // 2024-05-05
        usage.insert("1714521600".to_string(), 7); // 2024-05-01
        assert!(storage.merge_usage(&created.id, usage));

        let stats = svc.stats_at(&created.id, now).await.unwrap();
        assert_eq!(stats.last_day, 2);
        assert_eq!(stats.last_week, 7);
        assert_eq!(stats.all_time, 14);
    }

    #[tokio::test]
    async fn test_stats_for_unknown_id_is_zero() {
        let svc = service(Arc::new(MemoryStorage::new()));
        let stats = svc.stats("nope").await.unwrap();
        assert_eq!(stats, UsageStats::default());
    }

    #[test]
    fn test_short_url_trims_trailing_slash() {
        let settings = ServiceSettings {
            public_base_url: "https://s.example/".to_string(),
            ..ServiceSettings::default()
        };
        let svc = ShortieService::new(Arc::new(MemoryStorage::new()), settings);
        assert_eq!(svc.short_url("abc"), "https://s.example/shortie/abc");
    }
}
