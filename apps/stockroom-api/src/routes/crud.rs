//! Generic CRUD routes for reference tables.
//!
//! A table joins the dashboard by implementing [`Resource`]: which form
//! validates its input and which repository calls back each verb.
//!
//! ```text
//! GET    {base}        → list
//! POST   {base}        → Form::validate → create   → 201
//! GET    {base}/{id}   → get
//! PUT    {base}/{id}   → Form::validate → update
//! DELETE {base}/{id}   → delete                    → 204
//! ```

use std::future::Future;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::Serialize;
use stockroom_core::forms::{CustomerForm, ManufacturerForm, ProductForm};
use stockroom_core::{Customer, FormSchema, Manufacturer, Product, ProductView};
use stockroom_db::{Database, DbResult};
use tracing::debug;

use crate::error::ApiResult;
use crate::extractors::Form;
use crate::AppState;

/// Validated draft of a resource's form.
pub type Draft<R> = <<R as Resource>::Form as FormSchema>::Output;

/// A reference table exposed through the generic CRUD routes.
pub trait Resource: Send + Sync + 'static {
    /// Used in log lines.
    const NAME: &'static str;

    type Form: FormSchema<Output: Send> + DeserializeOwned + Send + 'static;
    type Item: Serialize + Send;

    fn list(db: &Database) -> impl Future<Output = DbResult<Vec<Self::Item>>> + Send;
    fn get(db: &Database, id: &str) -> impl Future<Output = DbResult<Self::Item>> + Send;
    fn create(
        db: &Database,
        draft: Draft<Self>,
    ) -> impl Future<Output = DbResult<Self::Item>> + Send;
    fn update(
        db: &Database,
        id: &str,
        draft: Draft<Self>,
    ) -> impl Future<Output = DbResult<Self::Item>> + Send;
    fn delete(db: &Database, id: &str) -> impl Future<Output = DbResult<()>> + Send;
}

/// Adds the five CRUD routes of `R` under `base`.
pub fn routes<R: Resource>(router: Router<AppState>, base: &str) -> Router<AppState> {
    router
        .route(base, get(list::<R>).post(create::<R>))
        .route(
            &format!("{base}/{{id}}"),
            get(show::<R>).put(update::<R>).delete(destroy::<R>),
        )
}

async fn list<R: Resource>(State(state): State<AppState>) -> ApiResult<Json<Vec<R::Item>>> {
    Ok(Json(R::list(&state.db).await?))
}

async fn show<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<R::Item>> {
    Ok(Json(R::get(&state.db, &id).await?))
}

async fn create<R: Resource>(
    State(state): State<AppState>,
    Form(form): Form<R::Form>,
) -> ApiResult<(StatusCode, Json<R::Item>)> {
    let draft = form.validate()?;
    debug!(resource = R::NAME, "Creating");
    let item = R::create(&state.db, draft).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<R::Form>,
) -> ApiResult<Json<R::Item>> {
    let draft = form.validate()?;
    debug!(resource = R::NAME, id = %id, "Updating");
    Ok(Json(R::update(&state.db, &id, draft).await?))
}

async fn destroy<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    debug!(resource = R::NAME, id = %id, "Deleting");
    R::delete(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Resources
// =============================================================================

impl Resource for Customer {
    const NAME: &'static str = "customer";
    type Form = CustomerForm;
    type Item = Customer;

    fn list(db: &Database) -> impl Future<Output = DbResult<Vec<Customer>>> + Send {
        async move { db.customers().list().await }
    }

    fn get(db: &Database, id: &str) -> impl Future<Output = DbResult<Customer>> + Send {
        async move { db.customers().get(id).await }
    }

    fn create(
        db: &Database,
        draft: Draft<Self>,
    ) -> impl Future<Output = DbResult<Customer>> + Send {
        async move { db.customers().create(draft).await }
    }

    fn update(
        db: &Database,
        id: &str,
        draft: Draft<Self>,
    ) -> impl Future<Output = DbResult<Customer>> + Send {
        async move { db.customers().update(id, draft).await }
    }

    fn delete(db: &Database, id: &str) -> impl Future<Output = DbResult<()>> + Send {
        async move { db.customers().delete(id).await }
    }
}

impl Resource for Manufacturer {
    const NAME: &'static str = "manufacturer";
    type Form = ManufacturerForm;
    type Item = Manufacturer;

    fn list(db: &Database) -> impl Future<Output = DbResult<Vec<Manufacturer>>> + Send {
        async move { db.manufacturers().list().await }
    }

    fn get(db: &Database, id: &str) -> impl Future<Output = DbResult<Manufacturer>> + Send {
        async move { db.manufacturers().get(id).await }
    }

    fn create(
        db: &Database,
        draft: Draft<Self>,
    ) -> impl Future<Output = DbResult<Manufacturer>> + Send {
        async move { db.manufacturers().create(draft).await }
    }

    fn update(
        db: &Database,
        id: &str,
        draft: Draft<Self>,
    ) -> impl Future<Output = DbResult<Manufacturer>> + Send {
        async move { db.manufacturers().update(id, draft).await }
    }

    fn delete(db: &Database, id: &str) -> impl Future<Output = DbResult<()>> + Send {
        async move { db.manufacturers().delete(id).await }
    }
}

/// Products carry the derived `current` column and go through the
/// repository that books opening stock.
impl Resource for Product {
    const NAME: &'static str = "product";
    type Form = ProductForm;
    type Item = ProductView;

    fn list(db: &Database) -> impl Future<Output = DbResult<Vec<ProductView>>> + Send {
        async move {
            let products = db.products().list().await?;
            Ok(products.into_iter().map(ProductView::from).collect())
        }
    }

    fn get(db: &Database, id: &str) -> impl Future<Output = DbResult<ProductView>> + Send {
        async move { db.products().get(id).await.map(ProductView::from) }
    }

    fn create(
        db: &Database,
        draft: Draft<Self>,
    ) -> impl Future<Output = DbResult<ProductView>> + Send {
        async move { db.products().create(draft).await.map(ProductView::from) }
    }

    fn update(
        db: &Database,
        id: &str,
        draft: Draft<Self>,
    ) -> impl Future<Output = DbResult<ProductView>> + Send {
        async move { db.products().update(id, draft).await.map(ProductView::from) }
    }

    fn delete(db: &Database, id: &str) -> impl Future<Output = DbResult<()>> + Send {
        async move { db.products().delete(id).await }
    }
}
