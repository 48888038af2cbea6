//! Session cart and wishlist.
//!
//! A [`CartStore`] is loaded from the visitor's session at the start of a
//! request, mutated synchronously, and saved back. It owns two independent
//! collections keyed by [`LineKey`]: cart lines and wishlist lines.

mod line;
mod session;
mod store;
mod wishlist;

pub use line::{CartLine, LineKey, WishlistLine};
pub use session::{load_cart, save_cart};
pub use store::CartStore;

use thiserror::Error;

/// Errors from cart and wishlist operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Nothing with that key is in the wishlist.
    #[error("item is not in the wishlist: {0}")]
    NotInWishlist(LineKey),

    /// The wishlist item cannot be bought right now.
    #[error("item is out of stock: {0}")]
    OutOfStock(LineKey),
}

#[cfg(test)]
pub(crate) use store::tests::product as sample_product;
