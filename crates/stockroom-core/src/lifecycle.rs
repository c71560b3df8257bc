//! # Status Lifecycles
//!
//! Transition tables for orders and purchase orders. A transition names the
//! ledger kinds that must be recorded for every line item, and the
//! workflows in stockroom-db apply exactly those, once.
//!
//! ## Order
//! ```text
//!             ┌──────── ordered ────────┐
//!   (new) ────┤                         ▼
//!             └─ ordered, sale ──►  delivered ◄── sale ── open
//!                                     (terminal)
//! ```
//!
//! ## Purchase Order
//! ```text
//!   (new) ──► pending ──► shipped ──► received (terminal)
//!     │          │                       ▲
//!     │          └────── received ───────┤
//!     └───────────── received ───────────┘
//! ```
//! Only the step into `received` touches stock.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::inventory::TransactionKind;

/// A status enum with a transition table.
pub trait Lifecycle: Copy + Eq + fmt::Display + Sized {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    /// Ledger kinds to record per line item when moving `from → to`.
    ///
    /// `from` is `None` when the record is being created. Returns
    /// [`CoreError::InvalidTransition`] for transitions outside the table.
    fn effects(id: &str, from: Option<Self>, to: Self) -> CoreResult<&'static [TransactionKind]>;

    /// Whether line items may still change in this status.
    fn items_editable(self) -> bool;

    /// Rejects item changes on a status whose items are frozen.
    fn ensure_items_editable(self, id: &str) -> CoreResult<()> {
        if self.items_editable() {
            Ok(())
        } else {
            Err(CoreError::LineItemsFrozen {
                entity: Self::ENTITY,
                id: id.to_string(),
                status: self.to_string(),
            })
        }
    }
}

fn invalid<S: Lifecycle>(id: &str, from: S, to: S) -> CoreError {
    CoreError::InvalidTransition {
        entity: S::ENTITY,
        id: id.to_string(),
        from: from.to_string(),
        to: to.to_string(),
    }
}

// =============================================================================
// Order Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum OrderStatus {
    /// Stock is reserved, nothing has left the building.
    #[default]
    Open,
    /// Goods handed over. Terminal.
    Delivered,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderStatus::Open => "open",
            OrderStatus::Delivered => "delivered",
        })
    }
}

impl Lifecycle for OrderStatus {
    const ENTITY: &'static str = "Order";

    fn effects(id: &str, from: Option<Self>, to: Self) -> CoreResult<&'static [TransactionKind]> {
        use OrderStatus::*;
        use TransactionKind::*;

        match (from, to) {
            (None, Open) => Ok(&[Ordered]),
            (None, Delivered) => Ok(&[Ordered, Sale]),
            (Some(Open), Open) | (Some(Delivered), Delivered) => Ok(&[]),
            (Some(Open), Delivered) => Ok(&[Sale]),
            (Some(from @ Delivered), to @ Open) => Err(invalid(id, from, to)),
        }
    }

    fn items_editable(self) -> bool {
        self == OrderStatus::Open
    }
}

// =============================================================================
// Purchase Order Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PurchaseOrderStatus {
    #[default]
    Pending,
    Shipped,
    /// Goods counted into stock. Terminal.
    Received,
}

impl PurchaseOrderStatus {
    const fn rank(self) -> u8 {
        match self {
            PurchaseOrderStatus::Pending => 0,
            PurchaseOrderStatus::Shipped => 1,
            PurchaseOrderStatus::Received => 2,
        }
    }
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PurchaseOrderStatus::Pending => "pending",
            PurchaseOrderStatus::Shipped => "shipped",
            PurchaseOrderStatus::Received => "received",
        })
    }
}

impl Lifecycle for PurchaseOrderStatus {
    const ENTITY: &'static str = "Purchase order";

    fn effects(id: &str, from: Option<Self>, to: Self) -> CoreResult<&'static [TransactionKind]> {
        match from {
            Some(from) if from.rank() > to.rank() => Err(invalid(id, from, to)),
            Some(PurchaseOrderStatus::Received) => Ok(&[]),
            _ if to == PurchaseOrderStatus::Received => Ok(&[TransactionKind::Received]),
            _ => Ok(&[]),
        }
    }

    fn items_editable(self) -> bool {
        self != PurchaseOrderStatus::Received
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
