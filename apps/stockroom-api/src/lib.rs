//! # Stockroom API
//!
//! JSON dashboard server for order entry and inventory.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Stockroom API                                   │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────────────────────────────────────┐│
//! │  │  Public        │  │  /dashboard/**  (require_session)              ││
//! │  │                │  │                                                ││
//! │  │ • GET  /       │  │ • customers, manufacturers, products (CRUD)    ││
//! │  │ • POST /signup │  │ • products/{id}/ledger, products/{id}/audit    ││
//! │  │ • POST /signin │  │ • orders (+ returns), purchase-orders          ││
//! │  │ • POST /signout│  │ • users/{id} (own account only)                ││
//! │  │ • GET  /signin │  │ • overview                                     ││
//! │  └────────────────┘  └────────────────────────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │  ┌──────────────────────────┐  ┌──────────────────────────────┐  │  │
//! │  │  │  stockroom-db (SQLite)   │  │  SessionManager (JWT cookie) │  │  │
//! │  │  └──────────────────────────┘  └──────────────────────────────┘  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables, see [`config::AppConfig`]:
//! - `STOCKROOM_BIND_ADDR` - listen address (default: 0.0.0.0:3000)
//! - `STOCKROOM_DATABASE_PATH` - SQLite file (default: ./stockroom.db)
//! - `SESSION_SECRET` - Secret for session token signing
//! - `SESSION_LIFETIME_SECS` - Session lifetime (default: 604800)

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use stockroom_db::Database;
use tower_http::trace::TraceLayer;

// Re-exports
pub use auth::SessionManager;
pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use middleware::SessionContext;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(db: Database, sessions: SessionManager) -> Self {
        AppState {
            db,
            sessions: Arc::new(sessions),
        }
    }
}

/// Build the full HTTP router.
pub fn router(state: AppState) -> Router {
    let dashboard = routes::dashboard_router().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::require_session,
    ));

    routes::public_router()
        .merge(dashboard)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
