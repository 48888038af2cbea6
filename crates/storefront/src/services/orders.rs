//! Order viewing and administration.

use tracing::instrument;

use crate::db::{OrderFilter, OrderLookup, OrderRepository, OrderStats, RepositoryError};
use crate::models::{AdminCapability, CurrentUser, Order, StatusUpdate};

/// Order service.
pub struct OrderService<'a> {
    orders: &'a dyn OrderRepository,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(orders: &'a dyn OrderRepository) -> Self {
        Self { orders }
    }

    /// Fetch an order the viewer is allowed to see.
    ///
    /// Orders the viewer may not see are reported as not found.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist or is
    /// not visible to `viewer`.
    #[instrument(skip(self, lookup, viewer), fields(lookup = %lookup))]
    pub async fn find_for_viewer(
        &self,
        lookup: &OrderLookup,
        viewer: Option<&CurrentUser>,
    ) -> Result<Order, RepositoryError> {
        let order = self.orders.get_order(lookup).await?;
        if !order.is_visible_to(viewer) {
            tracing::debug!("Order hidden from viewer");
            return Err(RepositoryError::NotFound);
        }
        Ok(order)
    }

    /// Orders for `user`, newest first. Admins see every order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the orders cannot be read.
    pub async fn list_for(&self, user: &CurrentUser) -> Result<Vec<Order>, RepositoryError> {
        let filter = if AdminCapability::verify(user).is_some() {
            OrderFilter::all()
        } else {
            OrderFilter::for_user(user.id)
        };
        self.orders.list_orders(filter).await
    }

    /// Apply an administrative status update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist, or
    /// `RepositoryError::Lifecycle` if the update is not allowed.
    #[instrument(skip(self, admin, lookup), fields(admin_id = admin.admin_id().as_i32(), lookup = %lookup))]
    pub async fn update_status(
        &self,
        admin: &AdminCapability,
        lookup: &OrderLookup,
        update: StatusUpdate,
    ) -> Result<Order, RepositoryError> {
        let order = self.orders.update_order_status(lookup, update).await?;
        tracing::info!(
            order_number = %order.order_number,
            status = %order.status,
            current_step = ?order.tracking_steps.current_step(),
            "Order status updated"
        );
        Ok(order)
    }

    /// Store-wide order figures.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the figures cannot be read.
    pub async fn stats(&self, _admin: &AdminCapability) -> Result<OrderStats, RepositoryError> {
        self.orders.order_stats().await
    }
}
