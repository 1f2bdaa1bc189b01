//! Server mode
//!
//! Starts the HTTP server, waits for Ctrl+C, stops accepting requests and
//! drains pending usage increments before returning.

use std::time::Duration;

use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::middleware::AccessLog;
use crate::api::services::shortie_routes;
use crate::config::StaticConfig;
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(config)
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {:#}", e))?;

    let storage = startup.storage.clone();
    let service = startup.service.clone();

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    info!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(AccessLog)
            .app_data(web::Data::new(service.clone()))
            .service(shortie_routes())
    })
    .keep_alive(Duration::from_secs(30))
    .workers(cpu_count)
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    warn!("Starting server at http://{}", bind_address);

    let handle = server.handle();
    let stopper = tokio::spawn(async move {
        lifetime::shutdown::wait_for_signal().await;
        // 停止接收新请求并等待进行中的请求完成
        handle.stop(true).await;
    });

    let served = server.await;
    stopper.abort();
    if let Err(e) = &served {
        tracing::error!("HTTP server stopped with error: {}", e);
    }

    lifetime::shutdown::drain_storage(
        &storage,
        Duration::from_secs(config.storage.shutdown_drain_secs),
    )
    .await;
    info!("Shutdown complete");

    served.context("HTTP server failed")
}
