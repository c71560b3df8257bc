//! # Domain Types
//!
//! Core records used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Manufacturer   │◄──│    Product      │◄──│ InventoryTxn    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, name       │   │  quantity       │   │  kind           │       │
//! │  │  contact        │   │  reserved       │   │  quantity (±)   │       │
//! │  └─────────────────┘   │  current (calc) │   │  reference_id   │       │
//! │                        └────────▲────────┘   └─────────────────┘       │
//! │                                 │                                       │
//! │  ┌─────────────────┐   ┌────────┴────────┐   ┌─────────────────┐       │
//! │  │    Customer     │◄──│     Order       │   │ PurchaseOrder   │       │
//! │  │  ─────────────  │   │  + OrderItem    │   │ + PO Item       │       │
//! │  │  id, name       │   │  status         │   │  status         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All ids are UUID v4 strings. Timestamps are UTC.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::inventory::{StockLevels, TransactionKind};
use crate::lifecycle::{OrderStatus, PurchaseOrderStatus};
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A stocked product.
///
/// `quantity` and `reserved` are only ever changed by the ledger writer;
/// `current` is derived and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Name the product is known by locally, if different.
    pub common_name: Option<String>,

    /// Manufacturer this product comes from.
    pub manufacturer_id: String,

    pub image_link: Option<String>,

    /// Units on hand.
    pub quantity: i64,

    /// Units promised to open orders.
    pub reserved: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Units available to promise: `quantity - reserved`.
    #[inline]
    pub fn current(&self) -> i64 {
        self.levels().current()
    }

    #[inline]
    pub fn levels(&self) -> StockLevels {
        StockLevels::new(self.quantity, self.reserved)
    }
}

/// Product as returned to clients, with the derived `current` column.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub current: i64,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let current = product.current();
        ProductView { product, current }
    }
}

// =============================================================================
// Reference Entities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A supplier of products.
///
/// Address parts are kept separate the way the purchasing team writes them
/// on shipping labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Manufacturer {
    pub id: String,
    pub name: String,
    /// Free-form contact handle (phone, chat id, email).
    pub contact: Option<String>,
    pub street_number: Option<i64>,
    pub street: Option<String>,
    pub zip: Option<i64>,
    pub bldg: Option<String>,
}

// =============================================================================
// User
// =============================================================================

/// A dashboard account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The public face of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        UserSummary {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// A sales order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Unique per creator.
    pub name: String,
    pub created_by_id: String,
    pub customer_id: Option<String>,
    pub status: OrderStatus,
    #[ts(as = "Option<String>")]
    pub delivered_date: Option<NaiveDate>,
    /// Total as submitted by the client. Stored, never recomputed.
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line of an order, keyed by (order, product).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub price_cents: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Purchase Orders
// =============================================================================

/// A purchase order placed with a manufacturer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseOrder {
    pub id: String,
    pub created_by_id: String,
    #[ts(as = "String")]
    pub order_date: NaiveDate,
    pub status: PurchaseOrderStatus,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl PurchaseOrder {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseOrderItem {
    pub purchase_order_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub price_cents: i64,
    /// Best-before date of the received lot, when the goods carry one.
    #[ts(as = "Option<String>")]
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseOrderDetail {
    #[serde(flatten)]
    pub purchase_order: PurchaseOrder,
    pub items: Vec<PurchaseOrderItem>,
}

// =============================================================================
// Inventory Ledger
// =============================================================================

/// An immutable ledger entry.
///
/// `reference_id` points at the order or purchase order that caused the
/// movement. Opening balances carry none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryTransaction {
    pub id: String,
    pub product_id: String,
    pub kind: TransactionKind,
    /// Signed quantity. Negative `ordered` entries release reservations.
    pub quantity: i64,
    pub reference_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Stored counters of a product compared against its ledger replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockAudit {
    pub product_id: String,
    pub stored: StockLevels,
    pub replayed: StockLevels,
    pub entries: i64,
    pub consistent: bool,
}

impl StockAudit {
    pub fn new(
        product_id: String,
        stored: StockLevels,
        replayed: StockLevels,
        entries: i64,
    ) -> Self {
        StockAudit {
            product_id,
            stored,
            replayed,
            entries,
            consistent: stored == replayed,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(quantity: i64, reserved: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            name: "Fuhouan".to_string(),
            common_name: Some("stomach relief".to_string()),
            manufacturer_id: "m-1".to_string(),
            image_link: None,
            quantity,
            reserved,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_product_current_is_derived() {
        assert_eq!(product(100, 10).current(), 90);
        assert_eq!(product(0, 0).current(), 0);
    }

    #[test]
    fn test_product_view_serializes_current() {
        let json = serde_json::to_value(ProductView::from(product(100, 10))).unwrap();
        assert_eq!(json["current"], 90);
        assert_eq!(json["commonName"], "stomach relief");
        assert_eq!(json["quantity"], 100);
    }

    #[test]
    fn test_user_hash_is_never_serialized() {
        let user = User {
            id: "u-1".to_string(),
            email: "ops@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn test_audit_flags_drift() {
        let ok = StockAudit::new("p".into(), StockLevels::new(5, 1), StockLevels::new(5, 1), 3);
        assert!(ok.consistent);
        let drift = StockAudit::new("p".into(), StockLevels::new(6, 1), StockLevels::new(5, 1), 3);
        assert!(!drift.consistent);
    }

    #[test]
    fn test_purchase_order_total_displays_stored_cents() {
        let now = Utc::now();
        let purchase_order = PurchaseOrder {
            id: "po-1".to_string(),
            created_by_id: "u-1".to_string(),
            order_date: now.date_naive(),
            status: PurchaseOrderStatus::Pending,
            total_cents: 250_075,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(purchase_order.total().cents(), 250_075);
        assert_eq!(purchase_order.total().to_string(), "$2500.75");
    }
}
