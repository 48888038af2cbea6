//! Wishlist operations.

use super::CartError;
use super::line::{CartLine, LineKey, WishlistLine};
use super::store::CartStore;
use crate::models::{CatalogProduct, Variant};

impl CartStore {
    /// Save `product` for later. Returns `false` if it was already saved.
    pub fn add_to_wishlist(&mut self, product: &CatalogProduct, variant: Option<Variant>) -> bool {
        let key = LineKey::new(product.id.clone(), variant);
        if self.wishlist.iter().any(|line| line.matches(&key)) {
            return false;
        }
        self.wishlist
            .push(WishlistLine::from_product(product, key.variant));
        true
    }

    /// Remove a wishlist line. Returns whether anything was removed.
    pub fn remove_from_wishlist(&mut self, key: &LineKey) -> bool {
        let before = self.wishlist.len();
        self.wishlist.retain(|line| !line.matches(key));
        self.wishlist.len() != before
    }

    #[must_use]
    pub fn wishlist(&self) -> &[WishlistLine] {
        &self.wishlist
    }

    #[must_use]
    pub fn in_wishlist(&self, key: &LineKey) -> bool {
        self.wishlist.iter().any(|line| line.matches(key))
    }

    /// Move one wishlist line into the cart as a single unit.
    ///
    /// Either both collections change or neither does.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInWishlist` if no line has that key, or
    /// `CartError::OutOfStock` if the line is not currently purchasable.
    pub fn move_to_cart(&mut self, key: &LineKey) -> Result<(), CartError> {
        let index = self
            .wishlist
            .iter()
            .position(|line| line.matches(key))
            .ok_or_else(|| CartError::NotInWishlist(key.clone()))?;

        let line = self
            .wishlist
            .get(index)
            .ok_or_else(|| CartError::NotInWishlist(key.clone()))?;
        if !line.in_stock {
            return Err(CartError::OutOfStock(key.clone()));
        }

        let cart_line = line.to_cart_line();
        self.wishlist.remove(index);
        self.merge_into_cart(cart_line);
        Ok(())
    }

    /// Move every in-stock wishlist line into the cart.
    ///
    /// Out-of-stock lines stay in the wishlist. Returns how many lines moved.
    pub fn move_all_in_stock_to_cart(&mut self) -> usize {
        let (movable, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut self.wishlist)
            .into_iter()
            .partition(|line| line.in_stock);
        self.wishlist = remaining;

        let moved = movable.len();
        for line in movable {
            self.merge_into_cart(line.to_cart_line());
        }
        moved
    }

    fn merge_into_cart(&mut self, incoming: CartLine) {
        let key = incoming.key();
        match self.items.iter_mut().find(|line| line.matches(&key)) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(incoming.quantity),
            None => self.items.push(incoming),
        }
    }
}
