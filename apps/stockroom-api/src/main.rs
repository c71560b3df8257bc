//! # Stockroom API
//!
//! HTTP server for the order-entry and inventory dashboard.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AppConfig::load() ─► Database::new (pool + migrations)                │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  SessionManager ─► router(state) ─► TcpListener ─► axum::serve         │
//! │                                                       │                 │
//! │                                  Ctrl+C / SIGTERM ───►┘ graceful stop   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use stockroom_api::{router, AppConfig, AppState, SessionManager};
use stockroom_db::Database;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Stockroom API server...");

    // Load configuration
    let config = AppConfig::load().context("loading configuration")?;
    info!(
        addr = %config.bind_addr,
        database = %config.database_path.display(),
        environment = %config.environment,
        policy = ?config.stock_policy(),
        "Configuration loaded"
    );

    // Connect to database (runs migrations)
    let db = Database::new(config.db_config())
        .await
        .context("opening database")?;

    let sessions = SessionManager::new(
        &config.session_secret,
        config.session_lifetime_secs,
        config.secure_cookie,
    );
    let state = AppState::new(db.clone(), sessions);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
