//! # Inventory Arithmetic
//!
//! The counter updater's rules as pure functions.
//!
//! ## Ledger Kinds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kind        quantity     reserved     current (= quantity - reserved) │
//! │  ─────────   ─────────    ─────────    ──────────────────────────────── │
//! │  received    + qty        ·            + qty                            │
//! │  return      + qty        ·            + qty                            │
//! │  ordered     ·            + qty        - qty                            │
//! │  sale        - qty        - qty        ·                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantities are signed. A negative `ordered` releases a reservation.
//!
//! ## Lifecycle of one order line
//! ```text
//! quantity=100 reserved=0  ──ordered 10──►  quantity=100 reserved=10
//!                                                   │
//!                                                sale 10
//!                                                   ▼
//!                                           quantity=90  reserved=0
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Transaction Kind
// =============================================================================

/// The kind of an inventory ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TransactionKind {
    /// Goods arrived from a manufacturer (or an opening balance).
    Received,
    /// Units promised to an order.
    Ordered,
    /// Delivered goods came back from a customer.
    Return,
    /// A reservation turned into a delivery.
    Sale,
}

impl TransactionKind {
    /// Signed change to `(quantity, reserved)` caused by `qty` units of this kind.
    #[inline]
    pub const fn effect(self, qty: i64) -> StockDelta {
        match self {
            TransactionKind::Received | TransactionKind::Return => StockDelta {
                quantity: qty,
                reserved: 0,
            },
            TransactionKind::Ordered => StockDelta {
                quantity: 0,
                reserved: qty,
            },
            TransactionKind::Sale => StockDelta {
                quantity: -qty,
                reserved: -qty,
            },
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Received => "received",
            TransactionKind::Ordered => "ordered",
            TransactionKind::Return => "return",
            TransactionKind::Sale => "sale",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed change to a product's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StockDelta {
    pub quantity: i64,
    pub reserved: i64,
}

// =============================================================================
// Stock Levels
// =============================================================================

/// A product's stored counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockLevels {
    /// Units on hand.
    pub quantity: i64,
    /// Units promised to open orders.
    pub reserved: i64,
}

impl StockLevels {
    #[inline]
    pub const fn new(quantity: i64, reserved: i64) -> Self {
        StockLevels { quantity, reserved }
    }

    /// Units available to promise.
    #[inline]
    pub const fn current(&self) -> i64 {
        self.quantity - self.reserved
    }

    /// Levels after applying `qty` units of `kind`. No policy checks.
    #[must_use]
    pub const fn apply(self, kind: TransactionKind, qty: i64) -> Self {
        let delta = kind.effect(qty);
        StockLevels {
            quantity: self.quantity.saturating_add(delta.quantity),
            reserved: self.reserved.saturating_add(delta.reserved),
        }
    }

    /// True if any counter (or the derived `current`) is below zero.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.quantity < 0 || self.reserved < 0 || self.current() < 0
    }

    /// Folds a ledger into counters, starting from zero.
    ///
    /// ```rust
    /// use stockroom_core::inventory::{StockLevels, TransactionKind::*};
    ///
    /// let levels = StockLevels::replay([(Received, 100), (Ordered, 10), (Sale, 10), (Received, 50)]);
    /// assert_eq!(levels, StockLevels::new(140, 0));
    /// ```
    pub fn replay<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (TransactionKind, i64)>,
    {
        entries
            .into_iter()
            .fold(StockLevels::default(), |levels, (kind, qty)| {
                levels.apply(kind, qty)
            })
    }
}

// =============================================================================
// Stock Policy
// =============================================================================

/// What the ledger writer does with an effect that would leave a counter
/// below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// Reject with [`CoreError::InsufficientStock`].
    #[default]
    Strict,
    /// Apply anyway. The caller is expected to log the anomaly.
    AllowNegative,
}

impl StockPolicy {
    /// Computes the levels after an effect and decides whether to admit them.
    ///
    /// ## Returns
    /// The resulting levels; under `AllowNegative` they may be negative.
    pub fn admit(
        self,
        product_id: &str,
        before: StockLevels,
        kind: TransactionKind,
        qty: i64,
    ) -> CoreResult<StockLevels> {
        let after = before.apply(kind, qty);

        if !after.is_negative() || self == StockPolicy::AllowNegative {
            return Ok(after);
        }

        let available = match kind {
            TransactionKind::Ordered => before.current(),
            TransactionKind::Sale => before.reserved.min(before.quantity),
            TransactionKind::Received | TransactionKind::Return => before.quantity,
        };

        Err(CoreError::InsufficientStock {
            product_id: product_id.to_string(),
            available,
            requested: qty,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_order_then_delivery_scenario() {
        let start = StockLevels::new(100, 0);

        let reserved = start.apply(TransactionKind::Ordered, 10);
        assert_eq!(reserved, StockLevels::new(100, 10));
        assert_eq!(reserved.current(), 90);

        let delivered = reserved.apply(TransactionKind::Sale, 10);
        assert_eq!(delivered, StockLevels::new(90, 0));
        assert_eq!(delivered.current(), 90);

        let received = delivered.apply(TransactionKind::Received, 50);
        assert_eq!(received, StockLevels::new(140, 0));
        assert_eq!(received.current(), 140);
    }

    #[test]
    fn test_negative_ordered_releases_reservation() {
        let levels = StockLevels::new(20, 8).apply(TransactionKind::Ordered, -3);
        assert_eq!(levels, StockLevels::new(20, 5));
    }

    #[test]
    fn test_strict_policy_rejects_over_reservation() {
        let err = StockPolicy::Strict
            .admit("p-1", StockLevels::new(5, 3), TransactionKind::Ordered, 4)
            .unwrap_err();

        match err {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 2);
                assert_eq!(requested, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_allow_negative_policy_admits() {
        let after = StockPolicy::AllowNegative
            .admit("p-1", StockLevels::new(5, 3), TransactionKind::Ordered, 4)
            .unwrap();
        assert_eq!(after.current(), -2);
        assert!(after.is_negative());
    }

    #[test]
    fn test_strict_policy_admits_exact_fit() {
        let after = StockPolicy::Strict
            .admit("p-1", StockLevels::new(5, 3), TransactionKind::Ordered, 2)
            .unwrap();
        assert_eq!(after.current(), 0);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransactionKind::Return).unwrap(),
            "\"return\""
        );
        assert_eq!(TransactionKind::Received.to_string(), "received");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_ordered_then_sale_consumes_exactly(
            quantity in 0i64..1_000_000,
            reserved in 0i64..1_000_000,
            qty in 0i64..100_000,
        ) {
            let before = StockLevels::new(quantity, reserved);
            let after = before
                .apply(TransactionKind::Ordered, qty)
                .apply(TransactionKind::Sale, qty);

            prop_assert_eq!(after.reserved, before.reserved);
            prop_assert_eq!(after.quantity, before.quantity - qty);
        }

        #[test]
        fn prop_received_never_touches_reserved(
            quantity in -1_000i64..1_000_000,
            reserved in 0i64..1_000_000,
            qty in 0i64..100_000,
        ) {
            let before = StockLevels::new(quantity, reserved);
            let after = before.apply(TransactionKind::Received, qty);

            prop_assert_eq!(after.quantity, before.quantity + qty);
            prop_assert_eq!(after.reserved, before.reserved);
        }

        #[test]
        fn prop_current_is_quantity_minus_reserved(
            ops in prop::collection::vec((0usize..4, -500i64..500), 0..50),
        ) {
            let kinds = [
                TransactionKind::Received,
                TransactionKind::Ordered,
                TransactionKind::Return,
                TransactionKind::Sale,
            ];
            let levels = StockLevels::replay(ops.iter().map(|&(k, q)| (kinds[k], q)));
            prop_assert_eq!(levels.current(), levels.quantity - levels.reserved);
        }

        #[test]
        fn prop_strict_policy_never_admits_negative(
            quantity in 0i64..1_000,
            reserved in 0i64..1_000,
            qty in -1_000i64..1_000,
            kind in 0usize..4,
        ) {
            let kinds = [
                TransactionKind::Received,
                TransactionKind::Ordered,
                TransactionKind::Return,
                TransactionKind::Sale,
            ];
            if let Ok(after) = StockPolicy::Strict.admit(
                "p",
                StockLevels::new(quantity, reserved),
                kinds[kind],
                qty,
            ) {
                prop_assert!(!after.is_negative());
            }
        }
    }
}
