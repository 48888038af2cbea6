//! Cart line operations.

use serde::{Deserialize, Serialize};

use shophub_core::{Money, Quantity};

use super::line::{CartLine, LineKey, WishlistLine};
use crate::models::{CatalogProduct, Variant};

/// The visitor's cart, wishlist and applied coupon.
///
/// Lines keep insertion order. At most one line exists per [`LineKey`] in
/// each collection, and every cart quantity is within `1..=10`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartStore {
    pub(super) items: Vec<CartLine>,
    pub(super) wishlist: Vec<WishlistLine>,
    /// Only the code is kept; the percentage is looked up again at pricing.
    pub(super) coupon_code: Option<String>,
}

impl CartStore {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line for the same product and variant grows, capped at
    /// ten; if the sum falls below one the line is removed. A new line snaps
    /// the product's current price. Quantities below one never create a line.
    pub fn add_item(&mut self, product: &CatalogProduct, quantity: i64, variant: Option<Variant>) {
        let key = LineKey::new(product.id.clone(), variant);

        if let Some(index) = self.items.iter().position(|line| line.matches(&key)) {
            let current = self
                .items
                .get(index)
                .map_or(0, |line| i64::from(line.quantity.get()));
            match Quantity::clamped(current.saturating_add(quantity)) {
                Some(next) => {
                    if let Some(line) = self.items.get_mut(index) {
                        line.quantity = next;
                    }
                }
                None => {
                    self.items.remove(index);
                }
            }
            return;
        }

        if let Some(quantity) = Quantity::clamped(quantity) {
            self.items
                .push(CartLine::from_product(product, quantity, key.variant));
        }
    }

    /// Set a line's quantity, capped at ten. Below one removes the line.
    ///
    /// Unknown keys are ignored.
    pub fn update_quantity(&mut self, key: &LineKey, quantity: i64) {
        match Quantity::clamped(quantity) {
            Some(next) => {
                if let Some(line) = self.items.iter_mut().find(|line| line.matches(key)) {
                    line.quantity = next;
                }
            }
            None => {
                self.remove_item(key);
            }
        }
    }

    /// Remove a line. Returns whether anything was removed.
    pub fn remove_item(&mut self, key: &LineKey) -> bool {
        let before = self.items.len();
        self.items.retain(|line| !line.matches(key));
        self.items.len() != before
    }

    /// Remove every cart line. The wishlist and coupon are kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// `Σ unit_price × quantity`.
    #[must_use]
    pub fn total(&self) -> Money {
        self.items.iter().map(CartLine::line_total).sum()
    }

    /// `Σ quantity`.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|line| line.quantity.get()).sum()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn line(&self, key: &LineKey) -> Option<&CartLine> {
        self.items.iter().find(|line| line.matches(key))
    }

    /// The applied coupon code, if any.
    #[must_use]
    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    /// Record an applied coupon code. Callers validate it first.
    pub fn set_coupon_code(&mut self, code: impl Into<String>) {
        self.coupon_code = Some(code.into());
    }

    /// Drop the applied coupon.
    pub fn clear_coupon(&mut self) {
        self.coupon_code = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use shophub_core::ProductId;

    use super::*;

    pub(crate) fn product(id: &str, cents: u32) -> CatalogProduct {
        CatalogProduct {
            id: ProductId::new(id).unwrap(),
            name: format!("Product {id}"),
            price: Money::from_cents(cents),
            original_price: None,
            image: Some(format!("/images/{id}.jpg")),
            stock: None,
        }
    }

    fn key(id: &str) -> LineKey {
        LineKey::new(ProductId::new(id).unwrap(), None)
    }

    fn red() -> Option<Variant> {
        Some(Variant {
            color: Some("Red".to_string()),
            size: None,
        })
    }

    #[test]
    fn test_add_new_line() {
        let mut cart = CartStore::new();
        cart.add_item(&product("1", 1999), 2, None);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total(), Money::from_cents(3998));
    }

    #[test]
    fn test_add_existing_line_merges_and_caps() {
        let mut cart = CartStore::new();
        let item = product("1", 1000);
        cart.add_item(&item, 6, None);
        cart.add_item(&item, 6, None);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line(&key("1")).unwrap().quantity, Quantity::MAX);
    }

    #[test]
    fn test_add_below_one_does_nothing() {
        let mut cart = CartStore::new();
        cart.add_item(&product("1", 1000), 0, None);
        cart.add_item(&product("2", 1000), -3, None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_negative_to_existing_line() {
        let mut cart = CartStore::new();
        let item = product("1", 1000);
        cart.add_item(&item, 3, None);
        cart.add_item(&item, -1, None);
        assert_eq!(cart.item_count(), 2);
        cart.add_item(&item, -5, None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_variants_are_separate_lines() {
        let mut cart = CartStore::new();
        let item = product("1", 1000);
        cart.add_item(&item, 1, None);
        cart.add_item(&item, 1, red());
        assert_eq!(cart.lines().len(), 2);

        let red_key = LineKey::new(item.id.clone(), red());
        assert_eq!(cart.line(&red_key).unwrap().quantity.get(), 1);
    }

    #[test]
    fn test_unit_price_is_snapshot() {
        let mut cart = CartStore::new();
        let mut item = product("1", 1000);
        cart.add_item(&item, 1, None);
        item.price = Money::from_cents(5000);
        cart.add_item(&item, 1, None);
        assert_eq!(cart.line(&key("1")).unwrap().unit_price, Money::from_cents(1000));
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = CartStore::new();
        cart.add_item(&product("1", 1000), 1, None);

        cart.update_quantity(&key("1"), 4);
        assert_eq!(cart.item_count(), 4);

        cart.update_quantity(&key("1"), 99);
        assert_eq!(cart.item_count(), 10);

        cart.update_quantity(&key("missing"), 3);
        assert_eq!(cart.lines().len(), 1);

        cart.update_quantity(&key("1"), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = CartStore::new();
        cart.add_item(&product("1", 1000), 1, None);
        assert!(cart.remove_item(&key("1")));
        assert!(!cart.remove_item(&key("1")));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear_keeps_coupon() {
        let mut cart = CartStore::new();
        cart.add_item(&product("1", 1000), 1, None);
        cart.set_coupon_code("SAVE10");
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.coupon_code(), Some("SAVE10"));
        cart.clear_coupon();
        assert_eq!(cart.coupon_code(), None);
    }

    #[test]
    fn test_total_rounds_to_cents() {
        let mut cart = CartStore::new();
        cart.add_item(&product("1", 333), 3, None);
        cart.add_item(&product("2", 1), 1, None);
        assert_eq!(cart.total(), Money::from_cents(1000));
    }

    #[test]
    fn test_serde_keeps_lines() {
        let mut cart = CartStore::new();
        cart.add_item(&product("1", 1000), 2, red());
        cart.set_coupon_code("WELCOME20");
        let json = serde_json::to_value(&cart).unwrap();
        let restored: CartStore = serde_json::from_value(json).unwrap();
        assert_eq!(restored, cart);

        let empty: CartStore = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }
}
