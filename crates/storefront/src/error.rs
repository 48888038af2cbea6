//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Responses are JSON: `{"error": "..."}`, plus a `fields` map for checkout
//! validation failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::cart::CartError;
use crate::db::RepositoryError;
use crate::pricing::PricingError;
use crate::services::CheckoutError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order or catalog storage failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Placing an order failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Coupon could not be applied.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Cart or wishlist operation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

const fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::DuplicateOrderNumber(_) | RepositoryError::Lifecycle(_) => {
            StatusCode::CONFLICT
        }
        RepositoryError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RepositoryError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn repository_message(err: &RepositoryError) -> String {
    match err {
        RepositoryError::NotFound => "Not found".to_string(),
        RepositoryError::DuplicateOrderNumber(_) => {
            "Could not allocate an order number, please try again".to_string()
        }
        RepositoryError::Lifecycle(e) => e.to_string(),
        RepositoryError::Validation(msg) => msg.clone(),
        RepositoryError::Unavailable(_) => "Service temporarily unavailable".to_string(),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            "Internal server error".to_string()
        }
    }
}

impl AppError {
    /// HTTP status this error is reported with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Repository(err) | Self::Checkout(CheckoutError::Repository(err)) => {
                repository_status(err)
            }
            Self::Checkout(CheckoutError::EmptyCart)
            | Self::Pricing(PricingError::UnknownCoupon(_)) => StatusCode::BAD_REQUEST,
            Self::Checkout(CheckoutError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Cart(CartError::NotInWishlist(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Cart(CartError::OutOfStock(_)) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Checkout(CheckoutError::OrderNumber(_))
            | Self::Pricing(PricingError::InvalidCouponEntry(_))
            | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Don't expose internal error details to clients
    fn public_message(&self) -> String {
        match self {
            Self::Repository(err) | Self::Checkout(CheckoutError::Repository(err)) => {
                repository_message(err)
            }
            Self::Checkout(CheckoutError::EmptyCart) => "Your cart is empty".to_string(),
            Self::Checkout(CheckoutError::Validation(_)) => {
                "Please correct the highlighted fields".to_string()
            }
            Self::Pricing(PricingError::UnknownCoupon(_)) => "Invalid coupon code".to_string(),
            Self::Cart(err) => err.to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::Unauthorized(msg) | Self::Forbidden(msg) => msg.clone(),
            Self::Checkout(CheckoutError::OrderNumber(_))
            | Self::Pricing(PricingError::InvalidCouponEntry(_))
            | Self::Session(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = match &self {
            Self::Checkout(CheckoutError::Validation(fields)) => json!({
                "error": self.public_message(),
                "fields": fields,
            }),
            _ => json!({ "error": self.public_message() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from the session user.
///
/// Call this once the request's user is known to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}
