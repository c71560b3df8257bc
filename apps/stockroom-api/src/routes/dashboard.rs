//! Dashboard overview.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use stockroom_core::{Customer, Manufacturer, Order, ProductView, PurchaseOrder};

use crate::error::ApiResult;
use crate::AppState;

/// Every table the dashboard shows on its landing page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub customers: Vec<Customer>,
    pub manufacturers: Vec<Manufacturer>,
    pub products: Vec<ProductView>,
    pub orders: Vec<Order>,
    pub purchase_orders: Vec<PurchaseOrder>,
}

pub async fn overview(State(state): State<AppState>) -> ApiResult<Json<Overview>> {
    let db = &state.db;
    Ok(Json(Overview {
        customers: db.customers().list().await?,
        manufacturers: db.manufacturers().list().await?,
        products: db.products().list().await?.into_iter().map(ProductView::from).collect(),
        orders: db.orders().list().await?,
        purchase_orders: db.purchase_orders().list().await?,
    }))
}
