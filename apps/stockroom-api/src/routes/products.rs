//! Product ledger history and audit.

use axum::extract::{Path, State};
use axum::Json;
use stockroom_core::{InventoryTransaction, StockAudit};

use crate::error::ApiResult;
use crate::AppState;

/// Ledger entries of one product, oldest first.
pub async fn ledger(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<InventoryTransaction>>> {
    // 404 for unknown products rather than an empty history
    state.db.products().get(&id).await?;
    Ok(Json(state.db.ledger().list_by_product(&id).await?))
}

pub async fn audit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StockAudit>> {
    Ok(Json(state.db.ledger().audit(&id).await?))
}
