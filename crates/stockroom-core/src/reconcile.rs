//! # Line-Item Reconciliation
//!
//! Plans how a persisted set of line items becomes a submitted set.
//!
//! ```text
//!   persisted                 submitted                  plan
//!   ─────────                 ─────────                  ────
//!   A ×3 @100                 A ×3 @100        ─►   (nothing)
//!   B ×5 @200                 B ×2 @200        ─►   upsert B, delta B -3
//!   C ×1 @50                                   ─►   delete C, delta C -1
//!                             D ×4 @75         ─►   upsert D, delta D +4
//! ```
//!
//! The plan is pure; stockroom-db executes it inside the same transaction
//! as the counter updates. Submitting the same set twice yields an empty
//! plan, so re-saving a form never creates rows or ledger entries.

use std::collections::{BTreeMap, HashSet};

use crate::error::ValidationError;
use crate::types::{OrderItem, PurchaseOrderItem};

/// A line item as seen by the planner.
pub trait LineItem: Clone {
    fn product_id(&self) -> &str;

    fn quantity(&self) -> i64;

    /// True when both rows carry identical non-key columns.
    fn same_terms(&self, other: &Self) -> bool;
}

/// Per-product signed quantity change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityDelta {
    pub product_id: String,
    pub delta: i64,
}

/// What to write to bring persisted rows in line with a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemPlan<T> {
    /// Rows that are new or changed.
    pub upserts: Vec<T>,
    /// Product ids whose rows must go.
    pub deletes: Vec<String>,
    /// Non-zero quantity changes, ordered by product id.
    pub deltas: Vec<QuantityDelta>,
}

impl<T> LineItemPlan<T> {
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletes.is_empty() && self.deltas.is_empty()
    }
}

impl<T> Default for LineItemPlan<T> {
    fn default() -> Self {
        LineItemPlan {
            upserts: Vec::new(),
            deletes: Vec::new(),
            deltas: Vec::new(),
        }
    }
}

/// Rejects a submission that names the same product twice.
pub fn ensure_unique_products<T: LineItem>(items: &[T]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.product_id()) {
            return Err(ValidationError::Duplicate {
                field: "items".to_string(),
                value: item.product_id().to_string(),
            });
        }
    }
    Ok(())
}

/// Diffs `submitted` against `persisted`.
///
/// ## Errors
/// [`ValidationError::Duplicate`] if `submitted` repeats a product.
pub fn plan<T: LineItem>(
    persisted: &[T],
    submitted: &[T],
) -> Result<LineItemPlan<T>, ValidationError> {
    ensure_unique_products(submitted)?;

    let existing: BTreeMap<&str, &T> = persisted.iter().map(|i| (i.product_id(), i)).collect();
    let mut plan = LineItemPlan::default();
    let mut deltas: BTreeMap<String, i64> = BTreeMap::new();

    for item in submitted {
        match existing.get(item.product_id()) {
            Some(old) if old.same_terms(item) => {}
            Some(old) => {
                *deltas.entry(item.product_id().to_string()).or_default() +=
                    item.quantity() - old.quantity();
                plan.upserts.push(item.clone());
            }
            None => {
                *deltas.entry(item.product_id().to_string()).or_default() += item.quantity();
                plan.upserts.push(item.clone());
            }
        }
    }

    let kept: HashSet<&str> = submitted.iter().map(LineItem::product_id).collect();
    for old in persisted {
        if !kept.contains(old.product_id()) {
            plan.deletes.push(old.product_id().to_string());
            *deltas.entry(old.product_id().to_string()).or_default() -= old.quantity();
        }
    }

    plan.deltas = deltas
        .into_iter()
        .filter(|(_, delta)| *delta != 0)
        .map(|(product_id, delta)| QuantityDelta { product_id, delta })
        .collect();

    Ok(plan)
}

impl LineItem for OrderItem {
    fn product_id(&self) -> &str {
        &self.product_id
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn same_terms(&self, other: &Self) -> bool {
        self.quantity == other.quantity && self.price_cents == other.price_cents
    }
}

impl LineItem for PurchaseOrderItem {
    fn product_id(&self) -> &str {
        &self.product_id
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn same_terms(&self, other: &Self) -> bool {
        self.quantity == other.quantity
            && self.price_cents == other.price_cents
            && self.expiration_date == other.expiration_date
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Line {
        product: String,
        qty: i64,
        price: i64,
    }

    fn line(product: &str, qty: i64, price: i64) -> Line {
        Line {
            product: product.to_string(),
            qty,
            price,
        }
    }

    impl LineItem for Line {
        fn product_id(&self) -> &str {
            &self.product
        }
        fn quantity(&self) -> i64 {
            self.qty
        }
        fn same_terms(&self, other: &Self) -> bool {
            self.qty == other.qty && self.price == other.price
        }
    }

    fn delta(product_id: &str, delta: i64) -> QuantityDelta {
        QuantityDelta {
            product_id: product_id.to_string(),
            delta,
        }
    }

    #[test]
    fn test_plan_mixed_changes() {
        let persisted = vec![line("A", 3, 100), line("B", 5, 200), line("C", 1, 50)];
        let submitted = vec![line("A", 3, 100), line("B", 2, 200), line("D", 4, 75)];

        let plan = plan(&persisted, &submitted).unwrap();

        assert_eq!(plan.upserts, vec![line("B", 2, 200), line("D", 4, 75)]);
        assert_eq!(plan.deletes, vec!["C".to_string()]);
        assert_eq!(
            plan.deltas,
            vec![delta("B", -3), delta("C", -1), delta("D", 4)]
        );
    }

    #[test]
    fn test_price_change_upserts_without_delta() {
        let plan = plan(&[line("A", 3, 100)], &[line("A", 3, 120)]).unwrap();
        assert_eq!(plan.upserts.len(), 1);
        assert!(plan.deltas.is_empty());
    }

    #[test]
    fn test_same_set_twice_is_empty() {
        let items = vec![line("A", 3, 100), line("B", 5, 200)];
        assert!(plan(&items, &items).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_product_rejected() {
        let err = plan(&[], &[line("A", 1, 1), line("A", 2, 1)]).unwrap_err();
        assert!(matches!(err, ValidationError::Duplicate { .. }));
    }

    fn lines() -> impl Strategy<Value = Vec<Line>> {
        prop::collection::btree_map(0u8..12, (1i64..50, 0i64..500), 0..8).prop_map(|m| {
            m.into_iter()
                .map(|(p, (qty, price))| line(&format!("p{p}"), qty, price))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_applying_a_plan_makes_it_idempotent(persisted in lines(), submitted in lines()) {
            let first = plan(&persisted, &submitted).unwrap();

            let mut rows: BTreeMap<String, Line> =
                persisted.iter().map(|l| (l.product.clone(), l.clone())).collect();
            for id in &first.deletes {
                rows.remove(id);
            }
            for row in &first.upserts {
                rows.insert(row.product.clone(), row.clone());
            }
            let after: Vec<Line> = rows.into_values().collect();

            prop_assert!(plan(&after, &submitted).unwrap().is_empty());
        }

        #[test]
        fn prop_deltas_sum_to_total_quantity_change(persisted in lines(), submitted in lines()) {
            let plan = plan(&persisted, &submitted).unwrap();
            let before: i64 = persisted.iter().map(|l| l.qty).sum();
            let after: i64 = submitted.iter().map(|l| l.qty).sum();
            let net: i64 = plan.deltas.iter().map(|d| d.delta).sum();
            prop_assert_eq!(net, after - before);
        }
    }
}
