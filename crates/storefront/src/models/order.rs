//! Order domain types.
//!
//! An [`Order`] is a frozen snapshot of a cart at checkout plus the two
//! fields that change afterwards: `status` and `tracking_steps`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shophub_core::{Email, Money, OrderId, OrderNumber, OrderStatus, ProductId, Quantity, UserId};

use super::product::Variant;
use super::session::CurrentUser;
use super::tracking::{LifecycleError, StatusUpdate, StepOutcome, TrackingSteps};

/// One purchased line, frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemSnapshot {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: Quantity,
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
}

impl OrderItemSnapshot {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// Where the order ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    /// First and last name joined by a space.
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub zip_code: String,
}

/// Everything needed to create an order. Built by checkout, consumed by the
/// repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub order_number: OrderNumber,
    pub user_id: Option<UserId>,
    pub items: Vec<OrderItemSnapshot>,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub discount: Money,
    pub coupon_code: Option<String>,
    pub total: Money,
    pub shipping_info: ShippingInfo,
    pub tracking_steps: TrackingSteps,
    pub created_at: DateTime<Utc>,
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub user_id: Option<UserId>,
    pub items: Vec<OrderItemSnapshot>,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub discount: Money,
    pub coupon_code: Option<String>,
    pub total: Money,
    pub status: OrderStatus,
    pub shipping_info: ShippingInfo,
    pub tracking_steps: TrackingSteps,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Materialize a draft as a new pending order.
    #[must_use]
    pub fn from_draft(id: OrderId, draft: OrderDraft) -> Self {
        Self {
            id,
            order_number: draft.order_number,
            user_id: draft.user_id,
            items: draft.items,
            subtotal: draft.subtotal,
            shipping: draft.shipping,
            tax: draft.tax,
            discount: draft.discount,
            coupon_code: draft.coupon_code,
            total: draft.total,
            status: OrderStatus::Pending,
            shipping_info: draft.shipping_info,
            tracking_steps: draft.tracking_steps,
            created_at: draft.created_at,
            updated_at: draft.created_at,
        }
    }

    /// Apply an administrative status update.
    ///
    /// The whole update is validated before anything changes, so an error
    /// leaves the order untouched. An out-of-range `step_index` is ignored
    /// and reported as [`StepOutcome::OutOfRange`].
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError` if the status transition is not allowed, the
    /// step would be completed out of order, or the order is (or is being)
    /// cancelled and a step change was requested.
    pub fn apply_status_update(
        &mut self,
        update: StatusUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<StepOutcome>, LifecycleError> {
        let next = self.status.transition_to(update.status)?;

        let outcome = match update.step_index {
            Some(index) => {
                let outcome = self.tracking_steps.check(index)?;
                if outcome == StepOutcome::Completed && next == OrderStatus::Cancelled {
                    return Err(LifecycleError::OrderCancelled);
                }
                Some(outcome)
            }
            None => None,
        };

        self.status = next;
        if let (Some(index), Some(StepOutcome::Completed)) = (update.step_index, outcome) {
            self.tracking_steps.complete(index, now)?;
        }
        self.updated_at = now;
        Ok(outcome)
    }

    /// Whether `viewer` may see this order.
    ///
    /// Guest orders are visible to anyone holding the order number. Orders
    /// placed by a signed-in user are visible to that user and to admins.
    #[must_use]
    pub fn is_visible_to(&self, viewer: Option<&CurrentUser>) -> bool {
        match (self.user_id, viewer) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(owner), Some(user)) => owner == user.id || user.is_admin(),
        }
    }

    /// Total number of units across all items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity.get()).sum()
    }
}
