//! Main entry point for the catalog admin backend.
//!
//! This file initializes logging and configuration, connects to the
//! database, bootstraps the first super admin if configured, starts the
//! rate limiter sweeper and serves the API.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod services;
mod state;
mod utils;
mod validation;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use config::Config;
use database::Database;
use services::admin_service::AdminService;
use state::AppState;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let db = Database::new(&config).await?;
    let pool = db.pool().clone();

    if let Some(bootstrap) = &config.bootstrap_admin {
        AdminService::new(&pool, config.bcrypt_cost)
            .bootstrap_super_admin(bootstrap)
            .await
            .context("Failed to bootstrap super admin")?;
    }

    let sweep_every = Duration::from_secs(config.rate_limits.sweep_interval_seconds.max(1));
    let port = config.server_port;
    let state = AppState::new(pool, config);
    let _sweeper = state.rate_limiter.spawn_sweeper(sweep_every);

    let app = api::router(state);

    let bind_address = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!("Starting catalog admin server on port {}", port);
    axum::serve(listener, app).await?;

    db.close().await;
    Ok(())
}
