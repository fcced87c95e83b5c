//! HTTP server initialization and runtime setup.
//!
//! Selects the storage backend, starts the broadcast hub and runs the Axum
//! server until Ctrl+C.

use crate::config::{Config, DatabaseMode};
use crate::domain::broadcast::BroadcastHub;
use crate::domain::repositories::EntryStore;
use crate::infrastructure::persistence::{MemoryEntryStore, RedisEntryStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Opens the storage backend named by the configuration.
///
/// # Errors
///
/// Returns an error if Redis is selected and cannot be reached. There is no
/// fallback to the in-memory store.
pub async fn open_store(config: &Config) -> Result<Arc<dyn EntryStore>> {
    let store: Arc<dyn EntryStore> = match config.database_mode {
        DatabaseMode::InMem => Arc::new(MemoryEntryStore::new()),
        DatabaseMode::Redis => Arc::new(
            RedisEntryStore::connect(&config.redis_url)
                .await
                .context("Failed to open Redis entry store")?,
        ),
    };

    tracing::info!("Storage backend: {}", store.backend());
    Ok(store)
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Entry store (in-memory or Redis)
/// - Broadcast hub
/// - Axum HTTP server with graceful shutdown
///
/// On shutdown every live watcher stream is closed and the store is released.
///
/// # Errors
///
/// Returns an error if:
/// - Storage connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store = open_store(&config).await?;

    let hub = Arc::new(BroadcastHub::new(
        config.broadcast_queue_capacity,
        config.subscriber_buffer,
    ));

    let state = AppState::new(store.clone(), hub.clone());
    let app = app_router(state, &config.static_dir, &config.index_file);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal(hub.clone()))
        .await?;

    store.close().await?;
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl+C, after ending every watcher stream.
///
/// SSE responses never finish on their own, so they are closed here to let
/// graceful shutdown complete.
async fn shutdown_signal(hub: Arc<BroadcastHub>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }

    tracing::info!("Shutdown signal received");
    hub.close_all();
}
