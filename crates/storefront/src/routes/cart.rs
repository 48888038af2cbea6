//! Cart route handlers.
//!
//! Every handler loads the cart from the session, applies one change, saves
//! it back and returns the refreshed [`CartView`].

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use shophub_core::{Money, ProductId};

use crate::cart::{CartLine, CartStore, LineKey, load_cart, save_cart};
use crate::error::{AppError, Result};
use crate::models::{CatalogProduct, Variant};
use crate::pricing::{PricingCalculator, PricingResult};
use crate::state::AppState;

/// One cart line with its total.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLine,
    pub line_total: Money,
}

/// Cart as returned by every cart endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub count: u32,
    pub pricing: PricingResult,
    pub free_shipping_remaining: Money,
}

impl CartView {
    #[must_use]
    pub fn build(cart: &CartStore, pricing: &PricingCalculator) -> Self {
        let priced = pricing.price_cart(cart);
        Self {
            lines: cart
                .lines()
                .iter()
                .map(|line| CartLineView {
                    line: line.clone(),
                    line_total: line.line_total(),
                })
                .collect(),
            count: cart.item_count(),
            free_shipping_remaining: pricing.free_shipping_remaining(priced.subtotal),
            pricing: priced,
        }
    }
}

// =============================================================================
// Request Bodies
// =============================================================================

const fn default_quantity() -> i64 {
    1
}

/// Body for `POST /api/cart/add`.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub variant: Option<Variant>,
}

/// Body naming one cart or wishlist line.
#[derive(Debug, Deserialize)]
pub struct LineRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant: Option<Variant>,
}

impl LineRequest {
    #[must_use]
    pub fn key(self) -> LineKey {
        LineKey::new(self.product_id, self.variant)
    }
}

/// Body for `POST /api/cart/update`.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant: Option<Variant>,
    pub quantity: i64,
}

/// Body for `POST /api/cart/coupon`.
#[derive(Debug, Deserialize)]
pub struct CouponRequest {
    pub code: String,
}

// =============================================================================
// Helpers
// =============================================================================

/// Look up a product in the catalog, 404 if it does not exist.
pub(crate) async fn find_product(state: &AppState, id: &ProductId) -> Result<CatalogProduct> {
    state
        .catalog()
        .product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

async fn respond(state: &AppState, session: &Session, cart: &CartStore) -> Result<Json<CartView>> {
    save_cart(session, cart).await?;
    Ok(Json(CartView::build(cart, state.pricing())))
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::build(&cart, state.pricing())))
}

/// Add a product to the cart.
#[instrument(skip(state, session, body), fields(product_id = %body.product_id, quantity = body.quantity))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = find_product(&state, &body.product_id).await?;
    let mut cart = load_cart(&session).await?;
    cart.add_item(&product, body.quantity, body.variant);
    tracing::debug!(count = cart.item_count(), "Added to cart");
    respond(&state, &session, &cart).await
}

/// Set a line's quantity. Zero or less removes the line.
#[instrument(skip(state, session, body), fields(product_id = %body.product_id, quantity = body.quantity))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    let key = LineKey::new(body.product_id, body.variant);
    cart.update_quantity(&key, body.quantity);
    respond(&state, &session, &cart).await
}

/// Remove a line.
#[instrument(skip(state, session, body), fields(product_id = %body.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LineRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    if !cart.remove_item(&body.key()) {
        tracing::debug!("Remove of absent cart line ignored");
    }
    respond(&state, &session, &cart).await
}

/// Empty the cart. The wishlist and applied coupon are kept.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    respond(&state, &session, &cart).await
}

/// Cart item count.
pub async fn count(session: Session) -> Result<Json<Value>> {
    let cart = load_cart(&session).await?;
    Ok(Json(json!({ "count": cart.item_count() })))
}

/// Apply a coupon code.
#[instrument(skip(state, session, body))]
pub async fn apply_coupon(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CouponRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    let coupon = state.pricing().apply_coupon(&mut cart, &body.code)?;
    tracing::info!(code = %coupon.code, percent = coupon.percent, "Coupon applied");
    respond(&state, &session, &cart).await
}

/// Drop the applied coupon.
#[instrument(skip(state, session))]
pub async fn remove_coupon(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.clear_coupon();
    respond(&state, &session, &cart).await
}
