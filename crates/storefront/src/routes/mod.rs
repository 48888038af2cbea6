//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                         - Liveness
//! GET    /health/ready                   - Readiness (repository reachable)
//!
//! # Cart
//! GET    /api/cart                       - Cart view
//! POST   /api/cart/add                   - Add a product
//! POST   /api/cart/update                - Set a line's quantity
//! POST   /api/cart/remove                - Remove a line
//! POST   /api/cart/clear                 - Empty the cart
//! GET    /api/cart/count                 - Item count
//! POST   /api/cart/coupon                - Apply a coupon
//! DELETE /api/cart/coupon                - Drop the coupon
//!
//! # Wishlist
//! GET    /api/wishlist                   - Saved products
//! POST   /api/wishlist/add               - Save a product
//! POST   /api/wishlist/remove            - Remove a saved product
//! POST   /api/wishlist/move-to-cart      - Move one line to the cart
//! POST   /api/wishlist/move-all-to-cart  - Move every in-stock line
//!
//! # Orders
//! POST   /api/checkout                   - Place an order (201)
//! GET    /api/orders                     - Own orders (admin: all)
//! GET    /api/orders/{lookup}            - One order by number or ID
//! PATCH  /api/orders/{lookup}/status     - Advance an order (admin)
//! GET    /api/admin/stats                - Order figures (admin)
//! ```

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod orders;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .route(
            "/coupon",
            post(cart::apply_coupon).delete(cart::remove_coupon),
        )
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/remove", post(wishlist::remove))
        .route("/move-to-cart", post(wishlist::move_to_cart))
        .route("/move-all-to-cart", post(wishlist::move_all_to_cart))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list))
        .route("/{lookup}", get(orders::show))
        .route("/{lookup}/status", patch(orders::update_status))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .route("/checkout", post(checkout::place_order))
        .nest("/orders", order_routes())
        .route("/admin/stats", get(admin::stats))
}

/// Build the complete application: routes, sessions, tracing and Sentry.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", routes())
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
