//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are fixed-point so cart totals never pick up binary floating
//! point drift (`0.1 + 0.2` stays `0.3`).

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A unit or aggregate price in the store currency.
///
/// Serialized as a decimal string (`"19.99"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// This price multiplied by a quantity, saturating at the bounds of
    /// [`Decimal`].
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    // Saturates at the bounds of Decimal
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_times() {
        assert_eq!(Price::from_cents(1050).times(3), Price::from_cents(3150));
        assert_eq!(Price::from_cents(1050).times(0), Price::ZERO);
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let max = Price::new(Decimal::MAX);
        assert_eq!(max.times(2), max);
        assert_eq!(max + Price::from_cents(1), max);
        assert_eq!([max, max, max].into_iter().sum::<Price>(), max);

        let min = Price::new(Decimal::MIN);
        assert_eq!(min.times(3), min);
        assert_eq!(min + min, min);
    }

    #[test]
    fn test_sum_has_no_float_drift() {
        let total: Price = [Price::from_cents(10), Price::from_cents(20)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(30));
    }

    #[test]
    fn test_display_two_places() {
        assert_eq!(Price::new(Decimal::from(35)).to_string(), "35.00");
        assert_eq!(Price::from_cents(1999).to_string(), "19.99");
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Price::from_cents(1999)).unwrap();
        assert_eq!(json, "\"19.99\"");
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Price::from_cents(1999));
    }
}
