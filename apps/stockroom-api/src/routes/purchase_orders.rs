//! Purchase orders.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use stockroom_core::forms::PurchaseOrderForm;
use stockroom_core::{FormSchema, PurchaseOrder, PurchaseOrderDetail};

use crate::error::ApiResult;
use crate::extractors::Form;
use crate::middleware::SessionContext;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<PurchaseOrder>>> {
    Ok(Json(state.db.purchase_orders().list().await?))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PurchaseOrderDetail>> {
    Ok(Json(state.db.purchase_orders().get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Form(form): Form<PurchaseOrderForm>,
) -> ApiResult<(StatusCode, Json<PurchaseOrderDetail>)> {
    let draft = form.validate()?;
    let detail = state.db.purchase_orders().create(&session.user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<PurchaseOrderForm>,
) -> ApiResult<Json<PurchaseOrderDetail>> {
    let draft = form.validate()?;
    Ok(Json(state.db.purchase_orders().update(&id, draft).await?))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.purchase_orders().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
