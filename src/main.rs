use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

mod api;
mod config;
mod models;
mod services;
mod storage;

use api::routes::{create_router, AppState};
use config::Config;
use services::discovery::TrinoMetadataDiscovery;
use services::engine::TrinoEngine;
use services::query::Translator;
use services::sync::MetadataSync;
use storage::MemoryMetadataStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Executor connection and the services built on it
    let engine = Arc::new(TrinoEngine::new(
        config.trino.base_url(),
        config.trino.user.clone(),
        config.trino.catalog.clone(),
        config.trino.schema.clone(),
    ));
    let storage = Arc::new(MemoryMetadataStore::new());
    let discovery = Arc::new(TrinoMetadataDiscovery::new(engine.clone()));
    let sync = Arc::new(MetadataSync::new(discovery.clone(), storage.clone()));
    let translator = Arc::new(Translator::new(storage.clone(), engine.clone()));

    // Populate the store before serving; an unreachable executor is not
    // fatal since /sync can be retried at any time.
    info!("performing initial metadata sync");
    match sync.sync_all().await {
        Ok(()) => info!("initial metadata sync completed"),
        Err(e) => warn!("initial sync failed: {}", e),
    }

    let state = AppState {
        storage,
        engine,
        discovery,
        sync,
        translator,
        matcher: None,
    };
    let app = create_router(state);

    let addr: SocketAddr = config
        .server_address()
        .parse()
        .context("invalid listen address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app).await?;

    Ok(())
}
