use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::StaticConfig;
use crate::services::{ServiceSettings, ShortieService};
use crate::storage::{Storage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub service: Arc<ShortieService>,
}

/// 准备服务器启动的上下文：校验配置、创建存储后端和服务
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    config.validate().context("Invalid configuration")?;

    let storage = StorageFactory::create(&config.storage)
        .await
        .context("Failed to create storage backend")?;

    let service = Arc::new(ShortieService::new(
        storage.clone(),
        ServiceSettings::from_config(config),
    ));

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext { storage, service })
}
