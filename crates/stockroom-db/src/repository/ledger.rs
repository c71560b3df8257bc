//! # Inventory Ledger
//!
//! The ledger writer and counter updater, plus read access to the ledger.
//!
//! ## One Call, Two Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record(&mut tx, policy, entry)                                         │
//! │       │                                                                 │
//! │       ├── 1. SELECT quantity, reserved FROM products   (inside tx)      │
//! │       ├── 2. policy.admit(levels, kind, qty)           (pure, core)     │
//! │       ├── 3. INSERT INTO inventory_transactions                         │
//! │       └── 4. UPDATE products SET quantity += Δq, reserved += Δr         │
//! │                                                                         │
//! │  Any error → caller's transaction drops → both writes roll back        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The writer never opens its own transaction; it always runs on the
//! connection of the workflow that caused the movement.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use stockroom_core::{
    CoreError, InventoryTransaction, StockAudit, StockLevels, StockPolicy, TransactionKind,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::DbResult;

/// A movement to record.
#[derive(Debug, Clone, Copy)]
pub struct LedgerEntry<'a> {
    pub product_id: &'a str,
    pub kind: TransactionKind,
    /// Signed quantity.
    pub quantity: i64,
    /// Order or purchase order that caused the movement.
    pub reference_id: Option<&'a str>,
}

/// Reads a product's counters on the given connection.
pub(crate) async fn levels(conn: &mut SqliteConnection, product_id: &str) -> DbResult<StockLevels> {
    let row: Option<(i64, i64)> =
        sqlx::query_as("SELECT quantity, reserved FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_optional(conn)
            .await?;

    let (quantity, reserved) =
        row.ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
    Ok(StockLevels::new(quantity, reserved))
}

/// Appends a ledger row and applies its effect to the product counters.
///
/// ## Errors
/// - `ProductNotFound` if the product doesn't exist
/// - `InsufficientStock` under [`StockPolicy::Strict`] when a counter would go negative
pub async fn record(
    conn: &mut SqliteConnection,
    policy: StockPolicy,
    entry: LedgerEntry<'_>,
) -> DbResult<InventoryTransaction> {
    let before = levels(conn, entry.product_id).await?;
    let after = policy.admit(entry.product_id, before, entry.kind, entry.quantity)?;

    if after.is_negative() {
        warn!(
            product_id = %entry.product_id,
            kind = %entry.kind,
            quantity = entry.quantity,
            after_quantity = after.quantity,
            after_reserved = after.reserved,
            "Stock went negative"
        );
    }

    let txn = InventoryTransaction {
        id: Uuid::new_v4().to_string(),
        product_id: entry.product_id.to_string(),
        kind: entry.kind,
        quantity: entry.quantity,
        reference_id: entry.reference_id.map(str::to_string),
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO inventory_transactions
            (id, product_id, kind, quantity, reference_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&txn.id)
    .bind(&txn.product_id)
    .bind(txn.kind)
    .bind(txn.quantity)
    .bind(&txn.reference_id)
    .bind(txn.created_at)
    .execute(&mut *conn)
    .await?;

    let delta = entry.kind.effect(entry.quantity);
    sqlx::query(
        r#"
        UPDATE products
        SET quantity = quantity + ?, reserved = reserved + ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(delta.quantity)
    .bind(delta.reserved)
    .bind(txn.created_at)
    .bind(entry.product_id)
    .execute(&mut *conn)
    .await?;

    debug!(
        product_id = %entry.product_id,
        kind = %entry.kind,
        quantity = entry.quantity,
        reference_id = ?entry.reference_id,
        "Ledger entry recorded"
    );

    Ok(txn)
}

/// Sum of `return` entries already booked against one order line.
pub(crate) async fn returned_quantity(
    conn: &mut SqliteConnection,
    order_id: &str,
    product_id: &str,
) -> DbResult<i64> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(quantity), 0)
        FROM inventory_transactions
        WHERE reference_id = ? AND product_id = ? AND kind = ?
        "#,
    )
    .bind(order_id)
    .bind(product_id)
    .bind(TransactionKind::Return)
    .fetch_one(conn)
    .await?;
    Ok(total)
}

// =============================================================================
// Repository
// =============================================================================

/// Read side of the ledger.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Entries of one product, oldest first.
    pub async fn list_by_product(&self, product_id: &str) -> DbResult<Vec<InventoryTransaction>> {
        let rows = sqlx::query_as::<_, InventoryTransaction>(
            "SELECT * FROM inventory_transactions WHERE product_id = ? ORDER BY created_at, rowid",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Entries caused by one order or purchase order, oldest first.
    pub async fn list_by_reference(
        &self,
        reference_id: &str,
    ) -> DbResult<Vec<InventoryTransaction>> {
        let rows = sqlx::query_as::<_, InventoryTransaction>(
            r#"
            SELECT * FROM inventory_transactions
            WHERE reference_id = ?
            ORDER BY created_at, rowid
            "#,
        )
        .bind(reference_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Compares a product's stored counters with a replay of its ledger.
    pub async fn audit(&self, product_id: &str) -> DbResult<StockAudit> {
        let mut conn = self.pool.acquire().await?;
        let stored = levels(&mut conn, product_id).await?;

        let entries: Vec<(TransactionKind, i64)> = sqlx::query_as(
            r#"
            SELECT kind, quantity FROM inventory_transactions
            WHERE product_id = ?
            ORDER BY created_at, rowid
            "#,
        )
        .bind(product_id)
        .fetch_all(&mut *conn)
        .await?;

        let count = entries.len() as i64;
        let replayed = StockLevels::replay(entries);
        let audit = StockAudit::new(product_id.to_string(), stored, replayed, count);

        if !audit.consistent {
            warn!(
                product_id = %product_id,
                stored = ?stored,
                replayed = ?replayed,
                "Stock counters drifted from ledger"
            );
        }

        Ok(audit)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{manufacturer, product};
    use crate::{Database, DbConfig, DbError};

    #[tokio::test]
    async fn test_record_updates_counters_and_appends() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let maker = manufacturer(&db, "dat").await;
        let p = product(&db, &maker, "fuhouan", 100).await;

        let mut tx = db.pool().begin().await.unwrap();
        record(
            &mut tx,
            StockPolicy::Strict,
            LedgerEntry {
                product_id: &p.id,
                kind: TransactionKind::Ordered,
                quantity: 10,
                reference_id: Some("order-1"),
            },
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let p = db.products().get(&p.id).await.unwrap();
        assert_eq!((p.quantity, p.reserved, p.current()), (100, 10, 90));

        let entries = db.ledger().list_by_product(&p.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, TransactionKind::Received);
        assert_eq!(entries[0].reference_id, None);
        assert_eq!(entries[1].kind, TransactionKind::Ordered);
        assert_eq!(entries[1].reference_id.as_deref(), Some("order-1"));
    }

    #[tokio::test]
    async fn test_strict_rejection_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let maker = manufacturer(&db, "dat").await;
        let p = product(&db, &maker, "fuhouan", 5).await;

        let mut tx = db.pool().begin().await.unwrap();
        let err = record(
            &mut tx,
            StockPolicy::Strict,
            LedgerEntry {
                product_id: &p.id,
                kind: TransactionKind::Ordered,
                quantity: 6,
                reference_id: None,
            },
        )
        .await
        .unwrap_err();
        drop(tx);

        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { available: 5, requested: 6, .. })
        ));
        assert_eq!(db.ledger().list_by_product(&p.id).await.unwrap().len(), 1);
        assert_eq!(db.products().get(&p.id).await.unwrap().reserved, 0);
    }

    #[tokio::test]
    async fn test_allow_negative_applies_anyway() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let maker = manufacturer(&db, "dat").await;
        let p = product(&db, &maker, "fuhouan", 5).await;

        let mut tx = db.pool().begin().await.unwrap();
        record(
            &mut tx,
            StockPolicy::AllowNegative,
            LedgerEntry {
                product_id: &p.id,
                kind: TransactionKind::Ordered,
                quantity: 6,
                reference_id: None,
            },
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(db.products().get(&p.id).await.unwrap().current(), -1);
        assert!(db.ledger().audit(&p.id).await.unwrap().consistent);
    }

    #[tokio::test]
    async fn test_unknown_product_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let err = record(
            &mut conn,
            StockPolicy::Strict,
            LedgerEntry {
                product_id: "missing",
                kind: TransactionKind::Received,
                quantity: 1,
                reference_id: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_audit_detects_drift() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let maker = manufacturer(&db, "dat").await;
        let p = product(&db, &maker, "fuhouan", 20).await;

        let audit = db.ledger().audit(&p.id).await.unwrap();
        assert!(audit.consistent);
        assert_eq!(audit.entries, 1);

        sqlx::query("UPDATE products SET quantity = 21 WHERE id = ?")
            .bind(&p.id)
            .execute(db.pool())
            .await
            .unwrap();

        let audit = db.ledger().audit(&p.id).await.unwrap();
        assert!(!audit.consistent);
        assert_eq!(audit.stored.quantity, 21);
        assert_eq!(audit.replayed.quantity, 20);
    }
}
