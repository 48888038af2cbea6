//! Catalog-facing product types.
//!
//! The catalog is owned by another service. The storefront reads a product
//! only to snapshot its name and price into a cart or wishlist line.

use serde::{Deserialize, Serialize};

use shophub_core::{Money, ProductId};

/// A product as supplied by the catalog at add time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    /// Current selling price.
    pub price: Money,
    /// Pre-sale price, if the product is discounted.
    pub original_price: Option<Money>,
    pub image: Option<String>,
    /// Units on hand. `None` when the catalog does not track stock.
    pub stock: Option<u32>,
}

impl CatalogProduct {
    /// Whether the product can currently be bought.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock.is_none_or(|units| units > 0)
    }
}

/// A product variant selection.
///
/// Empty values are normalized away, so `{color: "", size: null}` and no
/// variant at all identify the same line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Variant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl Variant {
    /// Trim both fields and collapse an all-empty variant to `None`.
    #[must_use]
    pub fn normalize(variant: Option<Self>) -> Option<Self> {
        let variant = variant?;
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        let normalized = Self {
            color: clean(variant.color),
            size: clean(variant.size),
        };
        if normalized.color.is_none() && normalized.size.is_none() {
            None
        } else {
            Some(normalized)
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.color, &self.size) {
            (Some(color), Some(size)) => write!(f, "{color} / {size}"),
            (Some(only), None) | (None, Some(only)) => f.write_str(only),
            (None, None) => Ok(()),
        }
    }
}
