//! # Generic CRUD
//!
//! One repository for every reference table. A table opts in by
//! implementing [`Record`]: its columns, how to bind them, and how a
//! validated draft becomes (or changes) a row.
//!
//! ```text
//! ┌────────────────┐  FormSchema   ┌──────────────┐  Record::from_draft  ┌────────────┐
//! │ CustomerForm   │ ────────────► │ CustomerDraft│ ───────────────────► │ Customer   │
//! │ (JSON body)    │   validate    │ (clean data) │   Record::merge      │ (row)      │
//! └────────────────┘               └──────────────┘                      └─────┬──────┘
//!                                                                              │ bind_*
//!                                                                              ▼
//!                                                        CrudRepository<Customer> → SQLite
//! ```

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite, SqliteConnection, SqlitePool};
use stockroom_core::forms::{CustomerDraft, ManufacturerDraft, ProductDraft};
use stockroom_core::{Customer, Manufacturer, Product};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// A table row managed through [`CrudRepository`].
pub trait Record: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + Sized {
    /// Table name.
    const TABLE: &'static str;

    /// Human name used in not-found errors.
    const ENTITY: &'static str;

    /// Columns written on insert, `id` first.
    const INSERT_COLUMNS: &'static [&'static str];

    /// Columns written on update. `id` is bound last by the repository.
    const UPDATE_COLUMNS: &'static [&'static str];

    const ORDER_BY: &'static str;

    /// Validated form output.
    type Draft: Send;

    fn id(&self) -> &str;

    /// Builds a brand-new row.
    fn from_draft(id: String, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    /// Applies an edit, keeping identity and anything the form can't touch.
    fn merge(self, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    fn bind_insert<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;

    fn bind_update<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;
}

fn insert_sql<R: Record>() -> String {
    let placeholders = vec!["?"; R::INSERT_COLUMNS.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        R::TABLE,
        R::INSERT_COLUMNS.join(", "),
        placeholders
    )
}

fn update_sql<R: Record>() -> String {
    let assignments = R::UPDATE_COLUMNS
        .iter()
        .map(|col| format!("{col} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE {} SET {} WHERE id = ?", R::TABLE, assignments)
}

// =============================================================================
// Repository
// =============================================================================

/// List / get / create / update / delete for one [`Record`] type.
#[derive(Debug)]
pub struct CrudRepository<R> {
    pool: SqlitePool,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for CrudRepository<R> {
    fn clone(&self) -> Self {
        CrudRepository {
            pool: self.pool.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> CrudRepository<R> {
    pub fn new(pool: SqlitePool) -> Self {
        CrudRepository {
            pool,
            _record: PhantomData,
        }
    }

    pub async fn list(&self) -> DbResult<Vec<R>> {
        debug!(table = R::TABLE, "Listing records");

        let sql = format!("SELECT * FROM {} ORDER BY {}", R::TABLE, R::ORDER_BY);
        let rows = sqlx::query_as::<_, R>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<R>> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", R::TABLE);
        let row = sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Like [`find`](Self::find) but a missing row is [`DbError::NotFound`].
    pub async fn get(&self, id: &str) -> DbResult<R> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found(R::ENTITY, id))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", R::TABLE);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    pub async fn create(&self, draft: R::Draft) -> DbResult<R> {
        let mut conn = self.pool.acquire().await?;
        let record = R::from_draft(Uuid::new_v4().to_string(), draft, Utc::now());
        insert(&mut conn, &record).await?;

        info!(table = R::TABLE, id = %record.id(), "Record created");
        Ok(record)
    }

    pub async fn update(&self, id: &str, draft: R::Draft) -> DbResult<R> {
        let record = self.get(id).await?.merge(draft, Utc::now());

        let sql = update_sql::<R>();
        let result = record
            .bind_update(sqlx::query(&sql))
            .bind(record.id())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(R::ENTITY, id));
        }

        info!(table = R::TABLE, id = %id, "Record updated");
        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", R::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(R::ENTITY, id));
        }

        info!(table = R::TABLE, id = %id, "Record deleted");
        Ok(())
    }
}

/// Inserts a row on a caller-supplied connection (usually a transaction).
pub async fn insert<R: Record>(conn: &mut SqliteConnection, record: &R) -> DbResult<()> {
    let sql = insert_sql::<R>();
    record.bind_insert(sqlx::query(&sql)).execute(conn).await?;
    Ok(())
}

// =============================================================================
// Records
// =============================================================================

impl Record for Customer {
    const TABLE: &'static str = "customers";
    const ENTITY: &'static str = "Customer";
    const INSERT_COLUMNS: &'static [&'static str] = &["id", "name", "location", "created_at"];
    const UPDATE_COLUMNS: &'static [&'static str] = &["name", "location"];
    const ORDER_BY: &'static str = "name COLLATE NOCASE";

    type Draft = CustomerDraft;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: CustomerDraft, now: DateTime<Utc>) -> Self {
        Customer {
            id,
            name: draft.name,
            location: draft.location,
            created_at: now,
        }
    }

    fn merge(self, draft: CustomerDraft, _now: DateTime<Utc>) -> Self {
        Customer {
            name: draft.name,
            location: draft.location,
            ..self
        }
    }

    fn bind_insert<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.id)
            .bind(&self.name)
            .bind(&self.location)
            .bind(self.created_at)
    }

    fn bind_update<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query.bind(&self.name).bind(&self.location)
    }
}

impl Record for Manufacturer {
    const TABLE: &'static str = "manufacturers";
    const ENTITY: &'static str = "Manufacturer";
    const INSERT_COLUMNS: &'static [&'static str] =
        &["id", "name", "contact", "street_number", "street", "zip", "bldg"];
    const UPDATE_COLUMNS: &'static [&'static str] =
        &["name", "contact", "street_number", "street", "zip", "bldg"];
    const ORDER_BY: &'static str = "name COLLATE NOCASE";

    type Draft = ManufacturerDraft;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: ManufacturerDraft, _now: DateTime<Utc>) -> Self {
        Manufacturer {
            id,
            name: draft.name,
            contact: draft.contact,
            street_number: draft.street_number,
            street: draft.street,
            zip: draft.zip,
            bldg: draft.bldg,
        }
    }

    fn merge(self, draft: ManufacturerDraft, now: DateTime<Utc>) -> Self {
        Self::from_draft(self.id, draft, now)
    }

    fn bind_insert<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        self.bind_update(query.bind(&self.id))
    }

    fn bind_update<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.name)
            .bind(&self.contact)
            .bind(self.street_number)
            .bind(&self.street)
            .bind(self.zip)
            .bind(&self.bldg)
    }
}

/// Counters are absent from both column lists: only the ledger writer
/// touches `quantity` and `reserved`.
impl Record for Product {
    const TABLE: &'static str = "products";
    const ENTITY: &'static str = "Product";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "common_name",
        "manufacturer_id",
        "image_link",
        "created_at",
        "updated_at",
    ];
    const UPDATE_COLUMNS: &'static [&'static str] =
        &["name", "common_name", "manufacturer_id", "image_link", "updated_at"];
    const ORDER_BY: &'static str = "name COLLATE NOCASE";

    type Draft = ProductDraft;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: ProductDraft, now: DateTime<Utc>) -> Self {
        Product {
            id,
            name: draft.name,
            common_name: draft.common_name,
            manufacturer_id: draft.manufacturer_id,
            image_link: draft.image_link,
            quantity: 0,
            reserved: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn merge(self, draft: ProductDraft, now: DateTime<Utc>) -> Self {
        Product {
            name: draft.name,
            common_name: draft.common_name,
            manufacturer_id: draft.manufacturer_id,
            image_link: draft.image_link,
            updated_at: now,
            ..self
        }
    }

    fn bind_insert<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.id)
            .bind(&self.name)
            .bind(&self.common_name)
            .bind(&self.manufacturer_id)
            .bind(&self.image_link)
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn bind_update<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.name)
            .bind(&self.common_name)
            .bind(&self.manufacturer_id)
            .bind(&self.image_link)
            .bind(self.updated_at)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
