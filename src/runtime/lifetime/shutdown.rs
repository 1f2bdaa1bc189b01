use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{info, warn};

use crate::storage::Storage;

/// 等待 Ctrl+C 信号
pub async fn wait_for_signal() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping server...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}

/// 在超时内等待后台计数任务结束，返回被放弃的任务数
pub async fn drain_storage(storage: &Arc<dyn Storage>, drain: Duration) -> usize {
    let remaining = storage.drain(drain).await;

    if remaining == 0 {
        info!("All pending usage increments completed");
    } else {
        warn!(
            "Abandoning {} pending usage increments after {} seconds",
            remaining,
            drain.as_secs()
        );
    }

    remaining
}
