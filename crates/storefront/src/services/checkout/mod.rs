//! Checkout: turns the session cart into a stored order.
//!
//! The cart is only cleared once the repository has accepted the order, so
//! any failure leaves it exactly as it was.

mod error;
mod form;
mod order_number;

pub use error::CheckoutError;
pub use form::{CheckoutForm, ValidationErrors};
pub use order_number::{OrderNumberSource, RandomOrderNumbers};

use chrono::Utc;
use tracing::instrument;

use crate::cart::{CartLine, CartStore};
use crate::db::{OrderRepository, RepositoryError};
use crate::models::{CurrentUser, Order, OrderDraft, TrackingSteps};
use crate::pricing::PricingCalculator;

/// Checkout service.
pub struct CheckoutService<'a> {
    orders: &'a dyn OrderRepository,
    pricing: &'a PricingCalculator,
    numbers: &'a dyn OrderNumberSource,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(
        orders: &'a dyn OrderRepository,
        pricing: &'a PricingCalculator,
        numbers: &'a dyn OrderNumberSource,
    ) -> Self {
        Self {
            orders,
            pricing,
            numbers,
        }
    }

    /// Place an order for everything in `cart`.
    ///
    /// On success the cart lines and applied coupon are cleared. A clash on
    /// the generated order number is retried once with a fresh number.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no lines,
    /// `CheckoutError::Validation` if the form is invalid (nothing is
    /// submitted), or `CheckoutError::Repository` if the order could not be
    /// stored. The cart is unchanged in every error case.
    #[instrument(skip_all, fields(user_id = user.map(|u| u.id.as_i32())))]
    pub async fn place_order(
        &self,
        cart: &mut CartStore,
        form: &CheckoutForm,
        user: Option<&CurrentUser>,
    ) -> Result<Order, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let shipping_info = form.validate()?;
        let pricing = self.pricing.price_cart(cart);

        let now = Utc::now();
        let mut draft = OrderDraft {
            order_number: self.numbers.next_number(now)?,
            user_id: user.map(|u| u.id),
            items: cart.lines().iter().map(CartLine::snapshot).collect(),
            subtotal: pricing.subtotal,
            shipping: pricing.shipping,
            tax: pricing.tax,
            discount: pricing.discount,
            coupon_code: pricing.coupon.map(|coupon| coupon.code),
            total: pricing.total,
            shipping_info,
            tracking_steps: TrackingSteps::initial(now),
            created_at: now,
        };

        let order = match self.orders.create_order(draft.clone()).await {
            Err(RepositoryError::DuplicateOrderNumber(taken)) => {
                tracing::warn!(order_number = %taken, "Order number taken, regenerating");
                draft.order_number = self.numbers.next_number(Utc::now())?;
                self.orders.create_order(draft).await?
            }
            result => result?,
        };

        cart.clear();
        cart.clear_coupon();

        tracing::info!(
            order_number = %order.order_number,
            total = %order.total,
            items = order.item_count(),
            "Order placed"
        );
        Ok(order)
    }
}
