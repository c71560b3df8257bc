//! # Repository Module
//!
//! Workflow repositories. Reference tables (customers, manufacturers) go
//! through [`crate::crud::CrudRepository`]; everything that moves stock
//! lives here.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Handler                                                               │
//! │     │  db.orders().update(id, draft)                                   │
//! │     ▼                                                                   │
//! │  OrderRepository / PurchaseOrderRepository / ProductRepository         │
//! │     │  BEGIN                                                            │
//! │     │  status check + line-item reconcile     (stockroom-core)          │
//! │     │  ledger::record(...) for every effect   (ledger.rs)               │
//! │     │  COMMIT                                                           │
//! │     ▼                                                                   │
//! │  SQLite                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD and opening stock
//! - [`OrderRepository`](order::OrderRepository) - Orders, deliveries and returns
//! - [`PurchaseOrderRepository`](purchase_order::PurchaseOrderRepository) - Restocking
//! - [`LedgerRepository`](ledger::LedgerRepository) - Ledger history and audit
//! - [`UserRepository`](user::UserRepository) - Accounts

pub mod ledger;
pub mod order;
pub mod product;
pub mod purchase_order;
pub mod user;
