//! pwacache server entry point.
//!
//! Boots the offline cache engine (resume, or install and activate) and
//! serves host events as MCP tools on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use pwacache_client::{FetchClient, FetchConfig, Network};
use pwacache_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod notify;
mod state;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(origin = %config.origin, db = %config.db_path.display(), "starting pwacache on stdio transport");

    let db = CacheDb::open(&config.db_path).await?;
    let network: Arc<dyn Network> = Arc::new(FetchClient::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
        ..Default::default()
    })?);
    let notifications = Arc::new(notify::NotificationQueue::default());

    let state = Arc::new(state::HostState::new(&config, db, network, notifications)?);

    let engine = state.engine().await;
    match engine.start().await {
        Ok(lifecycle) => tracing::info!(%lifecycle, store = %engine.config().static_store_name(), "engine started"),
        Err(e) => tracing::error!("engine failed to start, requests will pass through: {}", e),
    }

    let handler = handler::PwaCacheServer::new(state.clone());
    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    state.engine().await.settle_writes().await;
    if let Err(e) = state.db.close().await {
        tracing::warn!("failed to close cache registry: {}", e);
    }
    tracing::info!("shut down");

    Ok(())
}
