//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `checkout` - Turns the session cart into a stored order
//! - `orders` - Order viewing (with visibility rules) and administration

pub mod checkout;
pub mod orders;

pub use checkout::{CheckoutError, CheckoutForm, CheckoutService, ValidationErrors};
pub use orders::OrderService;
