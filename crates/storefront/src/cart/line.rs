//! Cart and wishlist line types.

use core::fmt;

use serde::{Deserialize, Serialize};

use shophub_core::{Money, ProductId, Quantity};

use crate::models::{CatalogProduct, OrderItemSnapshot, Variant};

/// Identity of a cart or wishlist line: the product plus its variant.
///
/// The variant is always normalized, so an empty variant and no variant are
/// the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
}

impl LineKey {
    /// Build a key, normalizing the variant.
    #[must_use]
    pub fn new(product_id: ProductId, variant: Option<Variant>) -> Self {
        Self {
            product_id,
            variant: Variant::normalize(variant),
        }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Some(variant) => write!(f, "{} ({variant})", self.product_id),
            None => write!(f, "{}", self.product_id),
        }
    }
}

/// A product in the cart.
///
/// `unit_price` is the catalog price when the line was first added; later
/// catalog changes do not touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: Quantity,
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
}

impl CartLine {
    pub(crate) fn from_product(
        product: &CatalogProduct,
        quantity: Quantity,
        variant: Option<Variant>,
    ) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            image: product.image.clone(),
            variant,
        }
    }

    /// The line's identity.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            variant: self.variant.clone(),
        }
    }

    pub(crate) fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.variant == key.variant
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }

    /// Freeze this line for an order.
    #[must_use]
    pub fn snapshot(&self) -> OrderItemSnapshot {
        OrderItemSnapshot {
            product_id: self.product_id.clone(),
            name: self.name.clone(),
            unit_price: self.unit_price,
            quantity: self.quantity,
            image: self.image.clone(),
            variant: self.variant.clone(),
        }
    }
}

/// A product saved for later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub original_price: Option<Money>,
    pub in_stock: bool,
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
}

impl WishlistLine {
    pub(crate) fn from_product(product: &CatalogProduct, variant: Option<Variant>) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            original_price: product.original_price,
            in_stock: product.in_stock(),
            image: product.image.clone(),
            variant,
        }
    }

    /// The line's identity.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            variant: self.variant.clone(),
        }
    }

    pub(crate) fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.variant == key.variant
    }

    /// Whole-percent saving against `original_price`, when there is one.
    ///
    /// `None` unless the original price is strictly above the current price.
    #[must_use]
    pub fn savings_percent(&self) -> Option<u8> {
        use rust_decimal::prelude::ToPrimitive;

        let original = self.original_price?.amount();
        let current = self.unit_price.amount();
        if original <= current {
            return None;
        }
        let saved = (original - current) / original * rust_decimal::Decimal::ONE_HUNDRED;
        saved.round().to_u8()
    }

    pub(crate) fn to_cart_line(&self) -> CartLine {
        CartLine {
            product_id: self.product_id.clone(),
            name: self.name.clone(),
            unit_price: self.unit_price,
            quantity: Quantity::MIN,
            image: self.image.clone(),
            variant: self.variant.clone(),
        }
    }
}
