//! Orders and returns.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use stockroom_core::forms::{OrderForm, ReturnForm};
use stockroom_core::{FormSchema, InventoryTransaction, Order, OrderDetail};

use crate::error::ApiResult;
use crate::extractors::Form;
use crate::middleware::SessionContext;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.db.orders().list().await?))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderDetail>> {
    Ok(Json(state.db.orders().get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Form(form): Form<OrderForm>,
) -> ApiResult<(StatusCode, Json<OrderDetail>)> {
    let draft = form.validate()?;
    let detail = state.db.orders().create(&session.user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<OrderForm>,
) -> ApiResult<Json<OrderDetail>> {
    let draft = form.validate()?;
    Ok(Json(state.db.orders().update(&id, draft).await?))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.orders().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn record_return(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ReturnForm>,
) -> ApiResult<(StatusCode, Json<Vec<InventoryTransaction>>)> {
    let lines = form.validate()?;
    let booked = state.db.orders().record_return(&id, &lines).await?;
    Ok((StatusCode::CREATED, Json(booked)))
}
