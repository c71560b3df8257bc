//! # Money Module
//!
//! Provides the `Money` type for order and purchase-order totals.
//!
//! ## Integer Cents
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The dashboard form computes totals as dollars × 100:                   │
//! │    19.99 * 100 = 1998.9999999999998  ❌                                 │
//! │                                                                         │
//! │  Integer cents end to end:                                              │
//! │    line items carry price_cents, orders carry total_cents               │
//! │    totals are computed by the client and stored as submitted            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Money` only wraps a stored amount for display in logs and plain text.
//!
//! ## Usage
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let total = Money::from_cents(1099);
//! assert_eq!(total.cents(), 1099);
//! assert_eq!(total.to_string(), "$10.99");
//! ```

use std::fmt;

/// A monetary value in the smallest currency unit (cents).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }
}

/// Display shows money as `$D.CC`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
        assert_eq!(format!("{}", Money::from_cents(7)), "$0.07");
    }

    #[test]
    fn test_display_extremes() {
        assert_eq!(Money::from_cents(i64::MIN).to_string(), "-$92233720368547758.08");
        assert_eq!(Money::from_cents(i64::MAX).to_string(), "$92233720368547758.07");
    }
}
