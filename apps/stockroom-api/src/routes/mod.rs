//! HTTP routes.
//!
//! - `auth.rs`: sign-up, sign-in, sign-out
//! - `crud.rs`: generic reference-table CRUD (customers, manufacturers, products)
//! - `products.rs`: ledger history and audit
//! - `orders.rs`, `purchase_orders.rs`: the stock-moving workflows
//! - `users.rs`: own account
//! - `dashboard.rs`: overview

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use stockroom_core::{Customer, Manufacturer, Product};

use crate::AppState;

pub mod auth;
pub mod crud;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod purchase_orders;
pub mod users;

/// Routes reachable without a session.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/health", get(health))
        .route("/signin", get(auth::landing).post(auth::sign_in))
        .route("/signup", post(auth::sign_up))
        .route("/signout", post(auth::sign_out))
}

/// Everything under `/dashboard`; the caller adds the session layer.
pub fn dashboard_router() -> Router<AppState> {
    let router = Router::new().route("/dashboard", get(dashboard::overview));

    let router = crud::routes::<Customer>(router, "/dashboard/customers");
    let router = crud::routes::<Manufacturer>(router, "/dashboard/manufacturers");
    let router = crud::routes::<Product>(router, "/dashboard/products");

    router
        .route("/dashboard/products/{id}/ledger", get(products::ledger))
        .route("/dashboard/products/{id}/audit", get(products::audit))
        .route("/dashboard/orders", get(orders::list).post(orders::create))
        .route(
            "/dashboard/orders/{id}",
            get(orders::show).put(orders::update).delete(orders::destroy),
        )
        .route("/dashboard/orders/{id}/returns", post(orders::record_return))
        .route(
            "/dashboard/purchase-orders",
            get(purchase_orders::list).post(purchase_orders::create),
        )
        .route(
            "/dashboard/purchase-orders/{id}",
            get(purchase_orders::show)
                .put(purchase_orders::update)
                .delete(purchase_orders::destroy),
        )
        .route(
            "/dashboard/users/{id}",
            get(users::show).put(users::update).delete(users::destroy),
        )
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "unavailable" })))
    }
}

// =============================================================================
// HTTP Tests
// =============================================================================
