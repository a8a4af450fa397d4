//! ARK API server
//!
//! Serves the OpenAI-compatible endpoints and the OpenAPI document.

use ark_api::query::KubeQueryStore;
use ark_api::{build_router, AppState, Config};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // kube's rustls transport needs a process-wide crypto provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    info!("Starting ARK API");

    let config = Config::from_env()?;
    info!("Configuration:");
    info!("  Listen address: {}", config.bind_addr);
    info!("  Namespace: {}", config.namespace);
    info!("  Auth mode: {}", config.auth_mode);
    info!("  Default query timeout: {}s", config.query_timeout_seconds);

    let store = KubeQueryStore::try_default().await?;
    let bind_addr = config.bind_addr;
    let app = build_router(AppState::new(config, Arc::new(store)));

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("ARK API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
