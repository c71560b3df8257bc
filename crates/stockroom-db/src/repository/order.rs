//! # Order Repository
//!
//! The order workflow: reservations, deliveries, returns.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── as open       → ordered +qty per item (reserve)                 │
//! │     └── as delivered  → ordered +qty, then sale qty per item           │
//! │                                                                         │
//! │  2. EDIT (open only)                                                   │
//! │     └── reconcile items → ordered ±delta per changed product           │
//! │                                                                         │
//! │  3. DELIVER                                                            │
//! │     └── open → delivered → sale qty per item (reserved → shipped)      │
//! │                                                                         │
//! │  4. RETURN (delivered only)                                            │
//! │     └── return qty ≤ delivered − already returned                      │
//! │                                                                         │
//! │  5. DELETE                                                             │
//! │     └── open: ordered −qty per item (release), then rows go            │
//! │     └── delivered: rows go, stock stays                                │
//! │                                                                         │
//! │  Every step is one transaction; the ledger rows always survive.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use stockroom_core::forms::{OrderDraft, ReturnLine};
use stockroom_core::reconcile;
use stockroom_core::{
    CoreError, InventoryTransaction, Lifecycle, Order, OrderDetail, OrderItem, OrderStatus,
    StockPolicy, TransactionKind,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::ledger::{self, LedgerEntry};

/// Repository for the order workflow.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
    policy: StockPolicy,
}

// =============================================================================
// Row helpers (run on the caller's transaction)
// =============================================================================

async fn fetch_order(conn: &mut SqliteConnection, id: &str) -> DbResult<Order> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| DbError::not_found("Order", id))
}

async fn fetch_items(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = ? ORDER BY rowid",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

async fn upsert_item(conn: &mut SqliteConnection, item: &OrderItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (order_id, product_id, quantity, price_cents)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (order_id, product_id)
        DO UPDATE SET quantity = excluded.quantity, price_cents = excluded.price_cents
        "#,
    )
    .bind(&item.order_id)
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(item.price_cents)
    .execute(conn)
    .await?;
    Ok(())
}

async fn write_header(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE orders
        SET name = ?, customer_id = ?, status = ?, delivered_date = ?,
            total_cents = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&order.name)
    .bind(&order.customer_id)
    .bind(order.status)
    .bind(order.delivered_date)
    .bind(order.total_cents)
    .bind(order.updated_at)
    .bind(&order.id)
    .execute(conn)
    .await?;
    Ok(())
}

fn to_items(order_id: &str, draft: &OrderDraft) -> Vec<OrderItem> {
    draft
        .items
        .iter()
        .map(|line| OrderItem {
            order_id: order_id.to_string(),
            product_id: line.product_id.clone(),
            quantity: line.quantity,
            price_cents: line.price_cents,
        })
        .collect()
}

// =============================================================================
// Workflow
// =============================================================================

impl OrderRepository {
    pub fn new(pool: SqlitePool, policy: StockPolicy) -> Self {
        OrderRepository { pool, policy }
    }

    /// Records every kind for every item, kind by kind.
    async fn apply_effects(
        &self,
        conn: &mut SqliteConnection,
        order_id: &str,
        kinds: &[TransactionKind],
        items: &[OrderItem],
    ) -> DbResult<()> {
        for &kind in kinds {
            for item in items {
                ledger::record(
                    conn,
                    self.policy,
                    LedgerEntry {
                        product_id: &item.product_id,
                        kind,
                        quantity: item.quantity,
                        reference_id: Some(order_id),
                    },
                )
                .await?;
            }
        }
        Ok(())
    }

    /// All orders, newest first.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    pub async fn get(&self, id: &str) -> DbResult<OrderDetail> {
        let mut conn = self.pool.acquire().await?;
        let order = fetch_order(&mut conn, id).await?;
        let items = fetch_items(&mut conn, id).await?;
        Ok(OrderDetail { order, items })
    }

    /// Creates an order and applies the effects of entering its status.
    ///
    /// An order created as delivered records its reservation and the
    /// matching sale, so `reserved` ends where it started.
    pub async fn create(&self, created_by_id: &str, draft: OrderDraft) -> DbResult<OrderDetail> {
        let id = Uuid::new_v4().to_string();
        let kinds = OrderStatus::effects(&id, None, draft.status)?;
        let items = to_items(&id, &draft);
        let now = Utc::now();

        let delivered_date = match draft.status {
            OrderStatus::Delivered => draft.delivered_date.or(Some(now.date_naive())),
            OrderStatus::Open => draft.delivered_date,
        };
        let order = Order {
            id,
            name: draft.name,
            created_by_id: created_by_id.to_string(),
            customer_id: draft.customer_id,
            status: draft.status,
            delivered_date,
            total_cents: draft.total_cents,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, name, created_by_id, customer_id, status,
                delivered_date, total_cents, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&order.id)
        .bind(&order.name)
        .bind(&order.created_by_id)
        .bind(&order.customer_id)
        .bind(order.status)
        .bind(order.delivered_date)
        .bind(order.total_cents)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &items {
            upsert_item(&mut tx, item).await?;
        }
        self.apply_effects(&mut tx, &order.id, kinds, &items).await?;

        tx.commit().await?;

        info!(
            id = %order.id,
            status = %order.status,
            items = items.len(),
            total = %order.total(),
            "Order created"
        );
        Ok(OrderDetail { order, items })
    }

    /// Saves an edited order.
    ///
    /// ## Steps (one transaction)
    /// 1. Read the current status and items inside the transaction
    /// 2. Check the status transition and, if items changed, that they may
    /// 3. Reconcile items; every quantity delta becomes an `ordered` entry
    /// 4. Write the header
    /// 5. Apply the transition's effects to the final item set
    ///
    /// Re-saving an unchanged order writes the header and nothing else.
    pub async fn update(&self, id: &str, draft: OrderDraft) -> DbResult<OrderDetail> {
        let mut tx = self.pool.begin().await?;

        let current = fetch_order(&mut tx, id).await?;
        let persisted = fetch_items(&mut tx, id).await?;
        let submitted = to_items(id, &draft);

        let kinds = OrderStatus::effects(id, Some(current.status), draft.status)?;
        let plan = reconcile::plan(&persisted, &submitted).map_err(CoreError::from)?;
        if !plan.is_empty() {
            current.status.ensure_items_editable(id)?;
        }

        for product_id in &plan.deletes {
            sqlx::query("DELETE FROM order_items WHERE order_id = ? AND product_id = ?")
                .bind(id)
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
        }
        for item in &plan.upserts {
            upsert_item(&mut tx, item).await?;
        }
        for delta in &plan.deltas {
            ledger::record(
                &mut tx,
                self.policy,
                LedgerEntry {
                    product_id: &delta.product_id,
                    kind: TransactionKind::Ordered,
                    quantity: delta.delta,
                    reference_id: Some(id),
                },
            )
            .await?;
        }

        let now = Utc::now();
        let delivered_date = match (current.status, draft.status) {
            (OrderStatus::Open, OrderStatus::Delivered) => {
                draft.delivered_date.or(Some(now.date_naive()))
            }
            _ => draft.delivered_date.or(current.delivered_date),
        };
        let order = Order {
            name: draft.name,
            customer_id: draft.customer_id,
            status: draft.status,
            delivered_date,
            total_cents: draft.total_cents,
            updated_at: now,
            ..current
        };
        write_header(&mut tx, &order).await?;

        self.apply_effects(&mut tx, id, kinds, &submitted).await?;

        let items = fetch_items(&mut tx, id).await?;
        tx.commit().await?;

        info!(
            id = %id,
            status = %order.status,
            upserts = plan.upserts.len(),
            deletes = plan.deletes.len(),
            effects = kinds.len(),
            "Order updated"
        );
        Ok(OrderDetail { order, items })
    }

    /// Deletes an order, releasing the reservations of an open one.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let order = fetch_order(&mut tx, id).await?;
        let items = fetch_items(&mut tx, id).await?;

        if order.status == OrderStatus::Open {
            for item in &items {
                ledger::record(
                    &mut tx,
                    self.policy,
                    LedgerEntry {
                        product_id: &item.product_id,
                        kind: TransactionKind::Ordered,
                        quantity: -item.quantity,
                        reference_id: Some(id),
                    },
                )
                .await?;
            }
        }

        sqlx::query("DELETE FROM order_items WHERE order_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            id = %id,
            status = %order.status,
            released = order.status == OrderStatus::Open,
            "Order deleted"
        );
        Ok(())
    }

    /// Books goods coming back on a delivered order.
    ///
    /// Each line is capped at the delivered quantity minus earlier returns
    /// of the same product on the same order.
    pub async fn record_return(
        &self,
        order_id: &str,
        lines: &[ReturnLine],
    ) -> DbResult<Vec<InventoryTransaction>> {
        let mut tx = self.pool.begin().await?;

        let order = fetch_order(&mut tx, order_id).await?;
        if order.status != OrderStatus::Delivered {
            return Err(CoreError::OrderNotDelivered(order_id.to_string()).into());
        }

        let delivered: HashMap<String, i64> = fetch_items(&mut tx, order_id)
            .await?
            .into_iter()
            .map(|item| (item.product_id, item.quantity))
            .collect();

        let mut booked = Vec::with_capacity(lines.len());
        for line in lines {
            let shipped = delivered.get(&line.product_id).copied().unwrap_or(0);
            let already = ledger::returned_quantity(&mut tx, order_id, &line.product_id).await?;
            let returnable = shipped - already;

            if line.quantity > returnable {
                return Err(CoreError::ReturnExceedsDelivered {
                    product_id: line.product_id.clone(),
                    returnable,
                    requested: line.quantity,
                }
                .into());
            }

            debug!(
                order_id = %order_id,
                product_id = %line.product_id,
                returnable,
                "Booking return"
            );
            booked.push(
                ledger::record(
                    &mut tx,
                    self.policy,
                    LedgerEntry {
                        product_id: &line.product_id,
                        kind: TransactionKind::Return,
                        quantity: line.quantity,
                        reference_id: Some(order_id),
                    },
                )
                .await?,
            );
        }

        tx.commit().await?;

        info!(order_id = %order_id, lines = booked.len(), "Return recorded");
        Ok(booked)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
