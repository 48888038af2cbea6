//! Checkout error types.

use thiserror::Error;

use shophub_core::OrderNumberError;

use super::form::ValidationErrors;
use crate::db::RepositoryError;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing in the cart to order.
    #[error("cart is empty")]
    EmptyCart,

    /// One or more form fields are invalid.
    #[error("checkout form invalid: {0}")]
    Validation(#[from] ValidationErrors),

    /// A generated order number was malformed.
    #[error("order number generation failed: {0}")]
    OrderNumber(#[from] OrderNumberError),

    /// The order could not be stored.
    #[error("order submission failed: {0}")]
    Repository(#[from] RepositoryError),
}
