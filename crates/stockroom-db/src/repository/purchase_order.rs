//! # Purchase Order Repository
//!
//! Restocking from manufacturers. Stock only moves when goods arrive:
//!
//! ```text
//! pending ──► shipped ──► received
//!    │           │           │
//!    │  (no stock effect)    └── received +qty per item, items frozen
//!    └──────────────────────────► received (skipping shipped is fine)
//! ```
//!
//! Moving backwards is rejected. Deleting a received purchase order keeps
//! its stock; the ledger rows are never removed.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use stockroom_core::forms::PurchaseOrderDraft;
use stockroom_core::reconcile;
use stockroom_core::{
    CoreError, Lifecycle, PurchaseOrder, PurchaseOrderDetail, PurchaseOrderItem,
    PurchaseOrderStatus, StockPolicy, TransactionKind,
};
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::ledger::{self, LedgerEntry};

#[derive(Debug, Clone)]
pub struct PurchaseOrderRepository {
    pool: SqlitePool,
    policy: StockPolicy,
}

async fn fetch_purchase_order(conn: &mut SqliteConnection, id: &str) -> DbResult<PurchaseOrder> {
    sqlx::query_as::<_, PurchaseOrder>("SELECT * FROM purchase_orders WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| DbError::not_found("Purchase order", id))
}

async fn fetch_items(
    conn: &mut SqliteConnection,
    purchase_order_id: &str,
) -> DbResult<Vec<PurchaseOrderItem>> {
    let items = sqlx::query_as::<_, PurchaseOrderItem>(
        "SELECT * FROM purchase_order_items WHERE purchase_order_id = ? ORDER BY rowid",
    )
    .bind(purchase_order_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

async fn upsert_item(conn: &mut SqliteConnection, item: &PurchaseOrderItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO purchase_order_items
            (purchase_order_id, product_id, quantity, price_cents, expiration_date)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (purchase_order_id, product_id)
        DO UPDATE SET
            quantity = excluded.quantity,
            price_cents = excluded.price_cents,
            expiration_date = excluded.expiration_date
        "#,
    )
    .bind(&item.purchase_order_id)
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(item.price_cents)
    .bind(item.expiration_date)
    .execute(conn)
    .await?;
    Ok(())
}

fn to_items(purchase_order_id: &str, draft: &PurchaseOrderDraft) -> Vec<PurchaseOrderItem> {
    draft
        .items
        .iter()
        .map(|line| PurchaseOrderItem {
            purchase_order_id: purchase_order_id.to_string(),
            product_id: line.product_id.clone(),
            quantity: line.quantity,
            price_cents: line.price_cents,
            expiration_date: line.expiration_date,
        })
        .collect()
}

impl PurchaseOrderRepository {
    pub fn new(pool: SqlitePool, policy: StockPolicy) -> Self {
        PurchaseOrderRepository { pool, policy }
    }

    /// Books every item as received.
    async fn receive(
        &self,
        conn: &mut SqliteConnection,
        purchase_order_id: &str,
        items: &[PurchaseOrderItem],
    ) -> DbResult<()> {
        for item in items {
            ledger::record(
                conn,
                self.policy,
                LedgerEntry {
                    product_id: &item.product_id,
                    kind: TransactionKind::Received,
                    quantity: item.quantity,
                    reference_id: Some(purchase_order_id),
                },
            )
            .await?;
        }
        Ok(())
    }

    pub async fn list(&self) -> DbResult<Vec<PurchaseOrder>> {
        let rows = sqlx::query_as::<_, PurchaseOrder>(
            "SELECT * FROM purchase_orders ORDER BY order_date DESC, created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: &str) -> DbResult<PurchaseOrderDetail> {
        let mut conn = self.pool.acquire().await?;
        let purchase_order = fetch_purchase_order(&mut conn, id).await?;
        let items = fetch_items(&mut conn, id).await?;
        Ok(PurchaseOrderDetail {
            purchase_order,
            items,
        })
    }

    pub async fn create(
        &self,
        created_by_id: &str,
        draft: PurchaseOrderDraft,
    ) -> DbResult<PurchaseOrderDetail> {
        let id = Uuid::new_v4().to_string();
        let kinds = PurchaseOrderStatus::effects(&id, None, draft.status)?;
        let items = to_items(&id, &draft);
        let now = Utc::now();

        let purchase_order = PurchaseOrder {
            id,
            created_by_id: created_by_id.to_string(),
            order_date: draft.order_date.unwrap_or_else(|| now.date_naive()),
            status: draft.status,
            total_cents: draft.total_cents,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO purchase_orders
                (id, created_by_id, order_date, status, total_cents, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&purchase_order.id)
        .bind(&purchase_order.created_by_id)
        .bind(purchase_order.order_date)
        .bind(purchase_order.status)
        .bind(purchase_order.total_cents)
        .bind(purchase_order.created_at)
        .bind(purchase_order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &items {
            upsert_item(&mut tx, item).await?;
        }
        if !kinds.is_empty() {
            self.receive(&mut tx, &purchase_order.id, &items).await?;
        }

        tx.commit().await?;

        info!(
            id = %purchase_order.id,
            status = %purchase_order.status,
            items = items.len(),
            total = %purchase_order.total(),
            "Purchase order created"
        );
        Ok(PurchaseOrderDetail {
            purchase_order,
            items,
        })
    }

    /// Saves an edited purchase order.
    ///
    /// Item edits before receipt don't touch stock; entering `received`
    /// books the final item set once.
    pub async fn update(
        &self,
        id: &str,
        draft: PurchaseOrderDraft,
    ) -> DbResult<PurchaseOrderDetail> {
        let mut tx = self.pool.begin().await?;

        let current = fetch_purchase_order(&mut tx, id).await?;
        let persisted = fetch_items(&mut tx, id).await?;
        let submitted = to_items(id, &draft);

        let kinds = PurchaseOrderStatus::effects(id, Some(current.status), draft.status)?;
        let plan = reconcile::plan(&persisted, &submitted).map_err(CoreError::from)?;
        if !plan.is_empty() {
            current.status.ensure_items_editable(id)?;
        }

        for product_id in &plan.deletes {
            sqlx::query(
                "DELETE FROM purchase_order_items WHERE purchase_order_id = ? AND product_id = ?",
            )
            .bind(id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        }
        for item in &plan.upserts {
            upsert_item(&mut tx, item).await?;
        }

        let purchase_order = PurchaseOrder {
            order_date: draft.order_date.unwrap_or(current.order_date),
            status: draft.status,
            total_cents: draft.total_cents,
            updated_at: Utc::now(),
            ..current
        };
        sqlx::query(
            r#"
            UPDATE purchase_orders
            SET order_date = ?, status = ?, total_cents = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(purchase_order.order_date)
        .bind(purchase_order.status)
        .bind(purchase_order.total_cents)
        .bind(purchase_order.updated_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if !kinds.is_empty() {
            self.receive(&mut tx, id, &submitted).await?;
        }

        let items = fetch_items(&mut tx, id).await?;
        tx.commit().await?;

        info!(
            id = %id,
            status = %purchase_order.status,
            upserts = plan.upserts.len(),
            deletes = plan.deletes.len(),
            received = !kinds.is_empty(),
            "Purchase order updated"
        );
        Ok(PurchaseOrderDetail {
            purchase_order,
            items,
        })
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        let purchase_order = fetch_purchase_order(&mut tx, id).await?;

        sqlx::query("DELETE FROM purchase_order_items WHERE purchase_order_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM purchase_orders WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id = %id, status = %purchase_order.status, "Purchase order deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture;
    use chrono::NaiveDate;
    use stockroom_core::forms::PurchaseOrderLine;

    fn purchase(status: PurchaseOrderStatus, lines: &[(&str, i64)]) -> PurchaseOrderDraft {
        PurchaseOrderDraft {
            order_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            status,
            total_cents: 0,
            items: lines
                .iter()
                .map(|(product_id, quantity)| PurchaseOrderLine {
                    product_id: product_id.to_string(),
                    quantity: *quantity,
                    price_cents: 100,
                    expiration_date: None,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_stock_moves_only_on_receipt() {
        let f = fixture(90).await;
        let repo = f.db.purchase_orders();

        let created = repo
            .create(&f.user.id, purchase(PurchaseOrderStatus::Pending, &[(&f.product.id, 50)]))
            .await
            .unwrap();
        repo.update(
            &created.purchase_order.id,
            purchase(PurchaseOrderStatus::Shipped, &[(&f.product.id, 50)]),
        )
        .await
        .unwrap();
        assert_eq!(f.db.products().get(&f.product.id).await.unwrap().quantity, 90);

        repo.update(
            &created.purchase_order.id,
            purchase(PurchaseOrderStatus::Received, &[(&f.product.id, 50)]),
        )
        .await
        .unwrap();
        let p = f.db.products().get(&f.product.id).await.unwrap();
        assert_eq!((p.quantity, p.reserved, p.current()), (140, 0, 140));

        // Re-saving a received purchase order books nothing more
        repo.update(
            &created.purchase_order.id,
            purchase(PurchaseOrderStatus::Received, &[(&f.product.id, 50)]),
        )
        .await
        .unwrap();
        assert_eq!(f.db.products().get(&f.product.id).await.unwrap().quantity, 140);

        let trail = f.db.ledger().list_by_reference(&created.purchase_order.id).await.unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].kind, TransactionKind::Received);
    }

    #[tokio::test]
    async fn test_order_and_restock_scenario() {
        use stockroom_core::forms::{OrderDraft, OrderLine};
        use stockroom_core::OrderStatus;

        let f = fixture(100).await;
        let line = OrderLine {
            product_id: f.product.id.clone(),
            quantity: 10,
            price_cents: 500,
        };
        let draft = OrderDraft {
            name: "Clinic".to_string(),
            customer_id: None,
            status: OrderStatus::Open,
            delivered_date: None,
            total_cents: 5000,
            items: vec![line],
        };

        let order = f.db.orders().create(&f.user.id, draft.clone()).await.unwrap();
        f.db.orders()
            .update(
                &order.order.id,
                OrderDraft {
                    status: OrderStatus::Delivered,
                    ..draft
                },
            )
            .await
            .unwrap();
        f.db.purchase_orders()
            .create(&f.user.id, purchase(PurchaseOrderStatus::Received, &[(&f.product.id, 50)]))
            .await
            .unwrap();

        let p = f.db.products().get(&f.product.id).await.unwrap();
        assert_eq!((p.quantity, p.reserved, p.current()), (140, 0, 140));
        assert!(f.db.ledger().audit(&p.id).await.unwrap().consistent);
    }

    #[tokio::test]
    async fn test_edits_before_receipt_touch_no_stock() {
        let f = fixture(10).await;
        let other = f.product_named("yunnanbaiyao", 0).await;
        let repo = f.db.purchase_orders();

        let created = repo
            .create(&f.user.id, purchase(PurchaseOrderStatus::Pending, &[(&f.product.id, 5)]))
            .await
            .unwrap();
        let saved = repo
            .update(
                &created.purchase_order.id,
                purchase(PurchaseOrderStatus::Pending, &[(&other.id, 8)]),
            )
            .await
            .unwrap();

        assert_eq!(saved.items.len(), 1);
        assert_eq!(saved.items[0].product_id, other.id);
        let entries = f.db.ledger().list_by_reference(&created.purchase_order.id).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_received_is_frozen_and_final() {
        let f = fixture(10).await;
        let repo = f.db.purchase_orders();
        let created = repo
            .create(&f.user.id, purchase(PurchaseOrderStatus::Received, &[(&f.product.id, 5)]))
            .await
            .unwrap();
        let id = &created.purchase_order.id;

        let err = repo
            .update(id, purchase(PurchaseOrderStatus::Received, &[(&f.product.id, 6)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::LineItemsFrozen { .. })));

        let err = repo
            .update(id, purchase(PurchaseOrderStatus::Shipped, &[(&f.product.id, 5)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_delete_keeps_received_stock() {
        let f = fixture(10).await;
        let repo = f.db.purchase_orders();
        let created = repo
            .create(&f.user.id, purchase(PurchaseOrderStatus::Received, &[(&f.product.id, 5)]))
            .await
            .unwrap();

        repo.delete(&created.purchase_order.id).await.unwrap();

        assert_eq!(f.db.products().get(&f.product.id).await.unwrap().quantity, 15);
        assert!(repo.list().await.unwrap().is_empty());
        assert!(matches!(
            repo.delete(&created.purchase_order.id).await,
            Err(DbError::NotFound { .. })
        ));
        assert_eq!(
            f.db.ledger().list_by_reference(&created.purchase_order.id).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_order_date_defaults_to_today() {
        let f = fixture(10).await;
        let mut draft = purchase(PurchaseOrderStatus::Pending, &[(&f.product.id, 1)]);
        draft.order_date = None;

        let created = f.db.purchase_orders().create(&f.user.id, draft).await.unwrap();
        assert_eq!(created.purchase_order.order_date, Utc::now().date_naive());
    }
}
