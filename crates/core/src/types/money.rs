//! Money and quantity primitives.
//!
//! All storefront amounts are single-currency, non-negative and carried at
//! two decimal places. Rounding is half-away-from-zero, so `2.345` becomes
//! `2.35`.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing [`Money`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Money values cannot be negative.
    #[error("amount cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative amount rounded to two decimal places.
///
/// ```
/// use rust_decimal::Decimal;
/// use shophub_core::{Money, Quantity};
///
/// let unit = Money::from_cents(1999);
/// let line = unit.times(Quantity::clamped(3).unwrap());
/// assert_eq!(line.to_string(), "$59.97");
/// assert!(Money::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a money value, rounding to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Negative` for amounts below zero.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative(amount));
        }
        Ok(Self(round_currency(amount)))
    }

    /// Create a money value from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// Clamp an arbitrary (possibly negative) amount to a money value.
    ///
    /// Negative results of arithmetic such as `subtotal - discount` floor at
    /// zero.
    #[must_use]
    pub fn floored(amount: Decimal) -> Self {
        if amount.is_sign_negative() {
            Self::ZERO
        } else {
            Self(round_currency(amount))
        }
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiply by a quantity.
    #[must_use]
    pub fn times(self, quantity: Quantity) -> Self {
        Self(round_currency(self.0 * Decimal::from(quantity.get())))
    }

    /// Multiply by a non-negative rate, e.g. a tax rate of `0.08`.
    ///
    /// Negative rates are treated as zero.
    #[must_use]
    pub fn scaled(self, rate: Decimal) -> Self {
        Self::floored(self.0 * rate)
    }

    /// A whole-number percentage of this amount (`percent` = 10 means 10%).
    #[must_use]
    pub fn percent(self, percent: u8) -> Self {
        self.scaled(Decimal::new(i64::from(percent), 2))
    }

    /// Subtract, flooring at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self::floored(self.0 - other.0)
    }
}

/// Round a decimal to the storefront's currency precision.
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(round_currency(self.0 + rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

/// A cart quantity, always within `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Smallest quantity a line can hold.
    pub const MIN: Self = Self(1);
    /// Largest quantity a line can hold.
    pub const MAX: Self = Self(10);

    /// Build a quantity, capping at [`Quantity::MAX`].
    ///
    /// Returns `None` for values below 1: a line with no units does not
    /// exist, so callers treat this as removal.
    #[must_use]
    pub fn clamped(requested: i64) -> Option<Self> {
        if requested < 1 {
            return None;
        }
        let capped = requested.min(i64::from(Self::MAX.0));
        u32::try_from(capped).ok().map(Self)
    }

    /// Add units, capping at [`Quantity::MAX`].
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0).min(Self::MAX.0))
    }

    /// The number of units.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u32> for Quantity {
    type Error = &'static str;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::clamped(i64::from(value)).ok_or("quantity must be at least 1")
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_rounds_half_away_from_zero() {
        assert_eq!(Money::new(dec("2.345")).unwrap().amount(), dec("2.35"));
        assert_eq!(Money::new(dec("2.344")).unwrap().amount(), dec("2.34"));
        assert_eq!(Money::new(dec("0.005")).unwrap().amount(), dec("0.01"));
    }

    #[test]
    fn test_new_rejects_negative() {
        assert_eq!(
            Money::new(dec("-0.01")),
            Err(MoneyError::Negative(dec("-0.01")))
        );
        assert!(Money::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_floored() {
        assert_eq!(Money::floored(dec("-3.50")), Money::ZERO);
        assert_eq!(Money::floored(dec("3.499")).amount(), dec("3.50"));
    }

    #[test]
    fn test_times_and_sum() {
        let a = Money::from_cents(1999).times(Quantity::clamped(2).unwrap());
        let b = Money::from_cents(501);
        let total: Money = [a, b].into_iter().sum();
        assert_eq!(total.amount(), dec("44.99"));
    }

    #[test]
    fn test_scaled_tax() {
        assert_eq!(Money::from_cents(3000).scaled(dec("0.08")).amount(), dec("2.40"));
        assert_eq!(Money::from_cents(1999).scaled(dec("0.08")).amount(), dec("1.60"));
        assert_eq!(Money::from_cents(1000).scaled(dec("-1")), Money::ZERO);
    }

    #[test]
    fn test_percent() {
        assert_eq!(Money::from_cents(10000).percent(10).amount(), dec("10.00"));
        assert_eq!(Money::from_cents(3333).percent(20).amount(), dec("6.67"));
    }

    #[test]
    fn test_saturating_sub() {
        let small = Money::from_cents(100);
        let big = Money::from_cents(500);
        assert_eq!(small.saturating_sub(big), Money::ZERO);
        assert_eq!(big.saturating_sub(small), Money::from_cents(400));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(3839).to_string(), "$38.39");
        assert_eq!(Money::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Money::from_cents(599)).unwrap();
        assert_eq!(json, "\"5.99\"");
        let parsed: Money = serde_json::from_str("\"5.99\"").unwrap();
        assert_eq!(parsed, Money::from_cents(599));
        assert!(serde_json::from_str::<Money>("\"-1\"").is_err());
    }

    #[test]
    fn test_quantity_clamped() {
        assert_eq!(Quantity::clamped(0), None);
        assert_eq!(Quantity::clamped(-4), None);
        assert_eq!(Quantity::clamped(1).unwrap().get(), 1);
        assert_eq!(Quantity::clamped(10).unwrap().get(), 10);
        assert_eq!(Quantity::clamped(11).unwrap().get(), 10);
        assert_eq!(Quantity::clamped(i64::MAX).unwrap().get(), 10);
    }

    #[test]
    fn test_quantity_saturating_add() {
        let two = Quantity::clamped(2).unwrap();
        let three = Quantity::clamped(3).unwrap();
        assert_eq!(two.saturating_add(three).get(), 5);
        assert_eq!(Quantity::MAX.saturating_add(two), Quantity::MAX);
    }

    #[test]
    fn test_quantity_deserialize() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        let q: Quantity = serde_json::from_str("12").unwrap();
        assert_eq!(q, Quantity::MAX);
    }
}
