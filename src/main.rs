use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use mockable::DefaultClock;
use tracing_subscriber::EnvFilter;

use golden_turf::auth::spawn_session_sweeper;
use golden_turf::config::AppConfig;
use golden_turf::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and friends
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting Golden Turf API in {:?} mode", config.environment);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let sweep_every = Duration::from_secs(config.security.session_sweep_interval_secs.max(1));

    let state = AppState::build(config, Arc::new(DefaultClock)).context("failed to build application state")?;

    if let Some(database) = &state.database {
        // Keep serving if the database is down; /health reports it
        if let Err(e) = database.ensure_schema().await {
            tracing::error!("Could not prepare database schema: {}", e);
        }
    }
    if let Err(e) = state.accounts.ensure_admin_exists().await {
        tracing::error!("Could not check for an admin account: {}", e);
    }

    let sweeper = spawn_session_sweeper(
        state.authenticator.sessions(),
        state.authenticator.clock(),
        sweep_every,
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Golden Turf API listening on http://{}", bind_addr);

    let database = state.database.clone();
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    sweeper.abort();
    if let Some(database) = database {
        database.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
