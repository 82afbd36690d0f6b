//! Travel Pass Desk Server Library
//!
//! Accounts register and log in, then submit, track and delete their own
//! travel pass requests. Storage is a single SQLite file.

pub mod accounts;
pub mod core;
pub mod handlers;
pub mod models;
pub mod passes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::core::{AppState, ServerConfig};
use passes::notifier::LogNotifier;

/// Install the global fmt subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        // Already set, ignore
    }
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("=== Pass Desk Server ===");

    let config = ServerConfig::from_env();
    config
        .ensure_dirs()
        .with_context(|| format!("Failed to create data root {:?}", config.root))?;

    info!("Data root: {:?}", config.root);
    info!("Database: {:?}", config.db_path);

    let port = config.port;
    let app_state = AppState::new(config, Arc::new(LogNotifier));

    // Schema is applied once, before the listener accepts anything
    app_state
        .database()
        .migrate()
        .await
        .context("Failed to apply database migrations")?;

    let app = crate::core::router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Pass Desk listening on http://localhost:{}", port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
