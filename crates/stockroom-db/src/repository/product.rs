//! # Product Repository
//!
//! Product CRUD on top of [`CrudRepository`], plus the opening balance.
//!
//! ```text
//! POST /dashboard/products { ..., openingQuantity: 40 }
//!      │
//!      ▼
//! BEGIN
//!   INSERT INTO products (quantity = 0, reserved = 0)
//!   ledger::record(received, 40, reference = NULL)  → quantity = 40
//! COMMIT
//! ```
//! Counters therefore always equal the replay of the product's ledger.

use chrono::Utc;
use sqlx::SqlitePool;
use stockroom_core::forms::ProductDraft;
use stockroom_core::{Product, StockPolicy, TransactionKind};
use tracing::{debug, info};
use uuid::Uuid;

use crate::crud::{self, CrudRepository, Record};
use crate::error::DbResult;
use crate::repository::ledger::{self, LedgerEntry};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    policy: StockPolicy,
    crud: CrudRepository<Product>,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool, policy: StockPolicy) -> Self {
        ProductRepository {
            crud: CrudRepository::new(pool.clone()),
            pool,
            policy,
        }
    }

    pub async fn list(&self) -> DbResult<Vec<Product>> {
        self.crud.list().await
    }

    pub async fn get(&self, id: &str) -> DbResult<Product> {
        self.crud.get(id).await
    }

    pub async fn count(&self) -> DbResult<i64> {
        self.crud.count().await
    }

    /// Inserts the product and books its opening balance in one transaction.
    pub async fn create(&self, mut draft: ProductDraft) -> DbResult<Product> {
        let opening = std::mem::take(&mut draft.opening_quantity);
        let mut product = Product::from_draft(Uuid::new_v4().to_string(), draft, Utc::now());

        let mut tx = self.pool.begin().await?;
        crud::insert(&mut tx, &product).await?;

        if opening > 0 {
            ledger::record(
                &mut tx,
                self.policy,
                LedgerEntry {
                    product_id: &product.id,
                    kind: TransactionKind::Received,
                    quantity: opening,
                    reference_id: None,
                },
            )
            .await?;
            product.quantity = opening;
        }

        tx.commit().await?;

        info!(id = %product.id, name = %product.name, opening, "Product created");
        Ok(product)
    }

    /// Updates descriptive columns. An `openingQuantity` on an edit is ignored.
    pub async fn update(&self, id: &str, draft: ProductDraft) -> DbResult<Product> {
        if draft.opening_quantity != 0 {
            debug!(id = %id, "Ignoring opening quantity on product update");
        }
        self.crud.update(id, draft).await
    }

    /// Deletes a product. Products with ledger history are kept by the
    /// foreign key and surface as a foreign-key violation.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        self.crud.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::manufacturer;
    use crate::{Database, DbConfig, DbError};

    fn draft(manufacturer_id: &str, opening: i64) -> ProductDraft {
        ProductDraft {
            name: "Yunnan Baiyao".to_string(),
            common_name: Some("bloodstaunching".to_string()),
            manufacturer_id: manufacturer_id.to_string(),
            image_link: None,
            opening_quantity: opening,
        }
    }

    #[tokio::test]
    async fn test_opening_quantity_books_received_entry() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let maker = manufacturer(&db, "china").await;

        let created = db.products().create(draft(&maker.id, 40)).await.unwrap();
        assert_eq!(created.quantity, 40);

        let stored = db.products().get(&created.id).await.unwrap();
        assert_eq!((stored.quantity, stored.reserved), (40, 0));

        let audit = db.ledger().audit(&created.id).await.unwrap();
        assert!(audit.consistent);
        assert_eq!(audit.entries, 1);
    }

    #[tokio::test]
    async fn test_zero_opening_quantity_books_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let maker = manufacturer(&db, "china").await;

        let created = db.products().create(draft(&maker.id, 0)).await.unwrap();
        assert!(db.ledger().list_by_product(&created.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_never_touches_counters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let maker = manufacturer(&db, "china").await;
        let created = db.products().create(draft(&maker.id, 12)).await.unwrap();

        let mut edit = draft(&maker.id, 999);
        edit.name = "Yunnan Baiyao Capsules".to_string();
        let updated = db.products().update(&created.id, edit).await.unwrap();

        assert_eq!(updated.name, "Yunnan Baiyao Capsules");
        assert_eq!(updated.quantity, 12);
        assert_eq!(db.products().get(&created.id).await.unwrap().quantity, 12);
    }

    #[tokio::test]
    async fn test_product_with_history_cannot_be_deleted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let maker = manufacturer(&db, "china").await;

        let fresh = db.products().create(draft(&maker.id, 0)).await.unwrap();
        db.products().delete(&fresh.id).await.unwrap();

        let stocked = db.products().create(draft(&maker.id, 3)).await.unwrap();
        let err = db.products().delete(&stocked.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
