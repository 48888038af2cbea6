//! Checkout route handler.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{load_cart, save_cart};
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::routes::orders::OrderView;
use crate::services::CheckoutForm;
use crate::state::AppState;

/// Place an order for the session cart.
///
/// Returns 201 with the stored order. The emptied cart is only saved back
/// once the order exists, so any failure leaves the session cart as it was.
#[instrument(skip_all)]
pub async fn place_order(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Json(form): Json<CheckoutForm>,
) -> Result<(StatusCode, Json<OrderView>)> {
    let mut cart = load_cart(&session).await?;
    let order = state
        .checkout()
        .place_order(&mut cart, &form, user.as_ref())
        .await?;

    if let Err(e) = save_cart(&session, &cart).await {
        // The order is already stored; report it rather than failing.
        tracing::error!(
            error = %e,
            order_number = %order.order_number,
            "Failed to clear cart after checkout"
        );
    }

    Ok((StatusCode::CREATED, Json(OrderView::from(order))))
}
