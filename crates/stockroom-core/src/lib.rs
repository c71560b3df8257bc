//! # stockroom-core: Pure Business Logic for Stockroom
//!
//! This crate holds the inventory bookkeeping rules of the order-entry
//! dashboard as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Dashboard frontend (JSON forms)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stockroom-api (axum)                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌──────────────────┐ │   │
//! │  │   │  types   │ │inventory │ │ lifecycle │ │ reconcile/forms  │ │   │
//! │  │   │ Product  │ │ Stock    │ │ Order     │ │ LineItemPlan     │ │   │
//! │  │   │ Order    │ │ Levels   │ │ Purchase  │ │ FieldErrors      │ │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └──────────────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               stockroom-db (Database Layer)                     │   │
//! │  │     SQLite queries, migrations, ledger writer, workflows        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, Order, PurchaseOrder, ...)
//! - [`money`] - Integer-cents amounts for display
//! - [`inventory`] - Ledger kinds and their effect on stock counters
//! - [`lifecycle`] - Order / purchase-order status transition tables
//! - [`reconcile`] - Line-item diffing between persisted and submitted sets
//! - [`forms`] - Form schemas producing field-level error maps
//! - [`validation`] - Field validators shared by the form schemas
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::inventory::{StockLevels, TransactionKind};
//!
//! let levels = StockLevels::new(100, 0);
//! let reserved = levels.apply(TransactionKind::Ordered, 10);
//! assert_eq!(reserved.current(), 90);
//!
//! let delivered = reserved.apply(TransactionKind::Sale, 10);
//! assert_eq!((delivered.quantity, delivered.reserved), (90, 0));
//! ```

pub mod error;
pub mod forms;
pub mod inventory;
pub mod lifecycle;
pub mod money;
pub mod reconcile;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use forms::{FieldErrors, FormSchema};
pub use inventory::{StockLevels, StockPolicy, TransactionKind};
pub use lifecycle::{Lifecycle, OrderStatus, PurchaseOrderStatus};
pub use money::Money;
pub use types::*;

/// Maximum line items accepted on a single order or purchase order.
pub const MAX_LINE_ITEMS: usize = 200;

/// Maximum quantity of a single line item.
///
/// Catches typing 10000 instead of 100 on a purchase order.
pub const MAX_LINE_QUANTITY: i64 = 100_000;
