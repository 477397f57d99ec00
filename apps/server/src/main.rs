//! Naira POS server entry point.
//!
//! ```text
//! .env ─► ServerConfig::load ─► Database (migrations) ─► settings.ensure
//!      ─► bootstrap admin ─► session sweeper ─► axum::serve (graceful)
//! ```

use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use naira_db::{Database, DbConfig};
use naira_server::state::spawn_sweeper;
use naira_server::{bootstrap_admin, build_router, AppState, ServerConfig};

const DEFAULT_LOG_FILTER: &str = "info,naira=debug,sqlx=warn,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(true)
        .init();

    info!("Starting Naira POS server...");

    let config = ServerConfig::load().context("loading configuration")?;
    info!(
        addr = %config.bind_addr,
        db = %config.db_path,
        utc_offset_minutes = config.utc_offset_minutes,
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(&config.db_path).max_connections(config.db_max_connections))
        .await
        .context("opening database")?;
    info!("Database ready");

    let settings = db
        .settings()
        .ensure(&config.store_defaults())
        .await
        .context("seeding store settings")?;
    info!(store = %settings.store_name, tax_rate_bps = settings.tax_rate_bps, "Store settings loaded");

    let state = AppState::new(db.clone(), config.clone())?;

    bootstrap_admin(&state).await.context("creating bootstrap admin")?;

    // Sweep at a tenth of the idle timeout, at least once a minute
    let sweep_every = (state.sessions.idle_timeout() / 10).clamp(Duration::from_secs(1), Duration::from_secs(60));
    let sweeper = spawn_sweeper(state.sessions.clone(), sweep_every);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "Listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    sweeper.abort();
    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
