//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{OrderRepository, PgOrderRepository, PgProductCatalog, ProductCatalog};
use crate::pricing::PricingCalculator;
use crate::services::checkout::{OrderNumberSource, RandomOrderNumbers};
use crate::services::{CheckoutService, OrderService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like repositories and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pricing: PricingCalculator,
    orders: Arc<dyn OrderRepository>,
    catalog: Arc<dyn ProductCatalog>,
    numbers: Arc<dyn OrderNumberSource>,
}

impl AppState {
    /// Create application state backed by `PostgreSQL`.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        Self::from_parts(
            config,
            Arc::new(PgOrderRepository::new(pool.clone())),
            Arc::new(PgProductCatalog::new(pool)),
            Arc::new(RandomOrderNumbers),
        )
    }

    /// Create application state from explicit collaborators.
    #[must_use]
    pub fn from_parts(
        config: StorefrontConfig,
        orders: Arc<dyn OrderRepository>,
        catalog: Arc<dyn ProductCatalog>,
        numbers: Arc<dyn OrderNumberSource>,
    ) -> Self {
        let pricing = PricingCalculator::new(config.pricing.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pricing,
                orders,
                catalog,
                numbers,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pricing(&self) -> &PricingCalculator {
        &self.inner.pricing
    }

    /// Get a reference to the order repository.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderRepository {
        self.inner.orders.as_ref()
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &dyn ProductCatalog {
        self.inner.catalog.as_ref()
    }

    /// Checkout service over this state's collaborators.
    #[must_use]
    pub fn checkout(&self) -> CheckoutService<'_> {
        CheckoutService::new(
            self.inner.orders.as_ref(),
            &self.inner.pricing,
            self.inner.numbers.as_ref(),
        )
    }

    /// Order service over this state's repository.
    #[must_use]
    pub fn order_service(&self) -> OrderService<'_> {
        OrderService::new(self.inner.orders.as_ref())
    }
}
