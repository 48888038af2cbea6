//! Order pricing.
//!
//! Totals are always derived from a subtotal and an optional coupon; nothing
//! here is stored on the cart.
//!
//! ```text
//! shipping = subtotal > threshold ? 0 : flat_rate
//! tax      = round(subtotal × tax_rate)
//! discount = round(subtotal × percent / 100)
//! total    = max(0, subtotal + shipping + tax − discount)
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use shophub_core::Money;

use crate::cart::CartStore;

/// Errors from pricing and coupon handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// The code is not in the coupon table.
    #[error("unknown coupon code: {0}")]
    UnknownCoupon(String),

    /// A coupon table entry could not be parsed.
    #[error("invalid coupon entry: {0}")]
    InvalidCouponEntry(String),
}

/// A recognized coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coupon {
    /// Canonical (uppercase) code.
    pub code: String,
    /// Whole-number percentage off the subtotal, `1..=100`.
    pub percent: u8,
}

/// Case-insensitive coupon code → percentage table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponTable {
    entries: BTreeMap<String, u8>,
}

impl Default for CouponTable {
    fn default() -> Self {
        Self {
            entries: BTreeMap::from([("SAVE10".to_string(), 10), ("WELCOME20".to_string(), 20)]),
        }
    }
}

impl CouponTable {
    /// Parse a table from `CODE=PERCENT` pairs separated by commas, e.g.
    /// `SAVE10=10,WELCOME20=20`.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidCouponEntry` for an entry without `=`,
    /// with an empty code, or with a percentage outside `1..=100`.
    pub fn parse(s: &str) -> Result<Self, PricingError> {
        let mut entries = BTreeMap::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let invalid = || PricingError::InvalidCouponEntry(entry.to_string());
            let (code, percent) = entry.split_once('=').ok_or_else(invalid)?;
            let code = code.trim();
            if code.is_empty() {
                return Err(invalid());
            }
            let percent: u8 = percent.trim().parse().map_err(|_| invalid())?;
            if !(1..=100).contains(&percent) {
                return Err(invalid());
            }
            entries.insert(code.to_uppercase(), percent);
        }
        Ok(Self { entries })
    }

    /// Look up a code, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::UnknownCoupon` if the code is not in the table.
    pub fn lookup(&self, code: &str) -> Result<Coupon, PricingError> {
        let canonical = code.trim().to_uppercase();
        self.entries
            .get(&canonical)
            .map(|&percent| Coupon {
                code: canonical.clone(),
                percent,
            })
            .ok_or_else(|| PricingError::UnknownCoupon(code.trim().to_string()))
    }

    /// Number of codes in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pricing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingConfig {
    /// Flat tax rate, e.g. `0.08`.
    pub tax_rate: Decimal,
    /// Subtotals strictly above this ship free.
    pub free_shipping_threshold: Money,
    /// Shipping charged at or below the threshold.
    pub flat_shipping: Money,
    pub coupons: CouponTable,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(8, 2),
            free_shipping_threshold: Money::from_cents(5000),
            flat_shipping: Money::from_cents(599),
            coupons: CouponTable::default(),
        }
    }
}

/// Derived totals for a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingResult {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
    /// The coupon that produced `discount`, if any.
    pub coupon: Option<Coupon>,
}

/// Computes [`PricingResult`]s from a [`PricingConfig`].
#[derive(Debug, Clone, Default)]
pub struct PricingCalculator {
    config: PricingConfig,
}

impl PricingCalculator {
    #[must_use]
    pub const fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Price a subtotal with an optional, already-resolved coupon.
    #[must_use]
    pub fn price(&self, subtotal: Money, coupon: Option<Coupon>) -> PricingResult {
        let shipping = if subtotal > self.config.free_shipping_threshold {
            Money::ZERO
        } else {
            self.config.flat_shipping
        };
        let tax = subtotal.scaled(self.config.tax_rate);
        let discount = coupon
            .as_ref()
            .map_or(Money::ZERO, |c| subtotal.percent(c.percent));
        let total = (subtotal + shipping + tax).saturating_sub(discount);

        PricingResult {
            subtotal,
            shipping,
            tax,
            discount,
            total,
            coupon,
        }
    }

    /// Price a cart, re-resolving its applied coupon code.
    ///
    /// A stored code that is no longer in the table is priced as no coupon.
    #[must_use]
    pub fn price_cart(&self, cart: &CartStore) -> PricingResult {
        let coupon = cart.coupon_code().and_then(|code| match self.config.coupons.lookup(code) {
            Ok(coupon) => Some(coupon),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring stale coupon on cart");
                None
            }
        });
        self.price(cart.total(), coupon)
    }

    /// Validate `code` and record it on the cart.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::UnknownCoupon` and leaves the cart untouched
    /// if the code is not recognized.
    pub fn apply_coupon(&self, cart: &mut CartStore, code: &str) -> Result<Coupon, PricingError> {
        let coupon = self.config.coupons.lookup(code)?;
        cart.set_coupon_code(coupon.code.clone());
        Ok(coupon)
    }

    /// How much more the visitor must spend to ship free.
    #[must_use]
    pub fn free_shipping_remaining(&self, subtotal: Money) -> Money {
        self.config.free_shipping_threshold.saturating_sub(subtotal)
    }
}
