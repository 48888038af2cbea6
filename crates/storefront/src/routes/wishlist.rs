//! Wishlist route handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{CartStore, WishlistLine, load_cart, save_cart};
use crate::error::Result;
use crate::routes::cart::{CartView, LineRequest, find_product};
use crate::state::AppState;

/// A saved product with its sale discount, if any.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistItemView {
    #[serde(flatten)]
    pub line: WishlistLine,
    pub savings_percent: Option<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WishlistView {
    pub items: Vec<WishlistItemView>,
    pub count: usize,
    /// Cart item count, for badge updates after a move.
    pub cart_count: u32,
}

impl From<&CartStore> for WishlistView {
    fn from(cart: &CartStore) -> Self {
        Self {
            items: cart
                .wishlist()
                .iter()
                .map(|line| WishlistItemView {
                    line: line.clone(),
                    savings_percent: line.savings_percent(),
                })
                .collect(),
            count: cart.wishlist().len(),
            cart_count: cart.item_count(),
        }
    }
}

/// Response for `POST /api/wishlist/move-all-to-cart`.
#[derive(Debug, Serialize)]
pub struct MoveAllResponse {
    pub moved: usize,
    pub wishlist: WishlistView,
    pub cart: CartView,
}

async fn respond(session: &Session, cart: &CartStore) -> Result<Json<WishlistView>> {
    save_cart(session, cart).await?;
    Ok(Json(WishlistView::from(cart)))
}

/// Show the wishlist.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<WishlistView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(WishlistView::from(&cart)))
}

/// Save a product for later. Saving the same line twice is a no-op.
#[instrument(skip(state, session, body), fields(product_id = %body.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LineRequest>,
) -> Result<Json<WishlistView>> {
    let product = find_product(&state, &body.product_id).await?;
    let mut cart = load_cart(&session).await?;
    if !cart.add_to_wishlist(&product, body.variant) {
        tracing::debug!("Product already in wishlist");
    }
    respond(&session, &cart).await
}

/// Remove a saved line.
#[instrument(skip(session, body), fields(product_id = %body.product_id))]
pub async fn remove(session: Session, Json(body): Json<LineRequest>) -> Result<Json<WishlistView>> {
    let mut cart = load_cart(&session).await?;
    cart.remove_from_wishlist(&body.key());
    respond(&session, &cart).await
}

/// Move one saved line into the cart.
#[instrument(skip(session, body), fields(product_id = %body.product_id))]
pub async fn move_to_cart(
    session: Session,
    Json(body): Json<LineRequest>,
) -> Result<Json<WishlistView>> {
    let mut cart = load_cart(&session).await?;
    cart.move_to_cart(&body.key())?;
    respond(&session, &cart).await
}

/// Move every in-stock saved line into the cart.
#[instrument(skip(state, session))]
pub async fn move_all_to_cart(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<MoveAllResponse>> {
    let mut cart = load_cart(&session).await?;
    let moved = cart.move_all_in_stock_to_cart();
    save_cart(&session, &cart).await?;
    tracing::info!(moved, left = cart.wishlist().len(), "Moved wishlist to cart");

    Ok(Json(MoveAllResponse {
        moved,
        wishlist: WishlistView::from(&cart),
        cart: CartView::build(&cart, state.pricing()),
    }))
}
