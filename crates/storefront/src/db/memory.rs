//! In-memory repositories.
//!
//! Used by tests and for running the storefront without a database. They
//! apply the same validation and lifecycle rules as the `PostgreSQL`
//! implementations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use shophub_core::{Money, OrderId, OrderStatus, ProductId};

use super::RepositoryError;
use super::catalog::ProductCatalog;
use super::orders::{
    OrderFilter, OrderLookup, OrderRepository, OrderStats, apply_update, validate_draft,
};
use crate::models::{CatalogProduct, Order, OrderDraft, StatusUpdate};

/// Order repository backed by a `Vec` behind a `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<Vec<Order>>,
    unavailable: AtomicBool,
}

impl InMemoryOrderRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `RepositoryError::Unavailable` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "in-memory repository marked unavailable".to_owned(),
            ));
        }
        Ok(())
    }

    /// Number of stored orders.
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, RepositoryError> {
        self.check_available()?;
        validate_draft(&draft)?;

        let mut orders = self.orders.write().await;
        if orders
            .iter()
            .any(|order| order.order_number == draft.order_number)
        {
            return Err(RepositoryError::DuplicateOrderNumber(draft.order_number));
        }

        let order = Order::from_draft(OrderId::generate(), draft);
        orders.push(order.clone());
        Ok(order)
    }

    async fn get_order(&self, lookup: &OrderLookup) -> Result<Order, RepositoryError> {
        self.check_available()?;
        self.orders
            .read()
            .await
            .iter()
            .find(|order| lookup.matches(order))
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        self.check_available()?;
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .iter()
            .rev()
            .filter(|order| filter.user_id.is_none() || order.user_id == filter.user_id)
            .cloned()
            .collect();
        // Stable sort: orders created in the same instant stay newest-inserted first.
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        lookup: &OrderLookup,
        update: StatusUpdate,
    ) -> Result<Order, RepositoryError> {
        self.check_available()?;
        let mut orders = self.orders.write().await;
        let stored = orders
            .iter_mut()
            .find(|order| lookup.matches(order))
            .ok_or(RepositoryError::NotFound)?;

        let mut updated = stored.clone();
        apply_update(&mut updated, update, Utc::now())?;
        *stored = updated.clone();
        Ok(updated)
    }

    async fn order_stats(&self) -> Result<OrderStats, RepositoryError> {
        self.check_available()?;
        let orders = self.orders.read().await;
        let pending = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count();

        Ok(OrderStats {
            total_orders: orders.len() as u64,
            pending_orders: pending as u64,
            total_revenue: orders
                .iter()
                .filter(|o| o.status != OrderStatus::Cancelled)
                .map(|o| o.total)
                .sum::<Money>(),
        })
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_available()
    }
}

/// Product catalog backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<ProductId, CatalogProduct>>,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog preloaded with `products`.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = CatalogProduct>) -> Self {
        Self {
            products: RwLock::new(
                products
                    .into_iter()
                    .map(|product| (product.id.clone(), product))
                    .collect(),
            ),
        }
    }

    /// Add or replace a product.
    pub async fn insert(&self, product: CatalogProduct) {
        self.products
            .write()
            .await
            .insert(product.id.clone(), product);
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn product(&self, id: &ProductId) -> Result<Option<CatalogProduct>, RepositoryError> {
        Ok(self.products.read().await.get(id).cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shophub_core::OrderNumber;

    use super::*;
    use crate::models::order::tests::sample_order;
    use crate::models::{LifecycleError, StatusUpdate};

    fn draft(number: &str) -> OrderDraft {
        let order = sample_order(None);
        OrderDraft {
            order_number: OrderNumber::parse(number).unwrap(),
            user_id: order.user_id,
            items: order.items,
            subtotal: order.subtotal,
            shipping: order.shipping,
            tax: order.tax,
            discount: order.discount,
            coupon_code: order.coupon_code,
            total: order.total,
            shipping_info: order.shipping_info,
            tracking_steps: order.tracking_steps,
            created_at: order.created_at,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryOrderRepository::new();
        let created = repo.create_order(draft("ORD-1-AAAAAAAAA")).await.unwrap();
        assert_eq!(created.status, OrderStatus::Pending);

        let by_number = repo
            .get_order(&OrderLookup::Number(created.order_number.clone()))
            .await
            .unwrap();
        let by_id = repo.get_order(&OrderLookup::Id(created.id)).await.unwrap();
        assert_eq!(by_number, created);
        assert_eq!(by_id, created);
    }

    #[tokio::test]
    async fn test_duplicate_order_number() {
        let repo = InMemoryOrderRepository::new();
        repo.create_order(draft("ORD-1-AAAAAAAAA")).await.unwrap();
        let err = repo.create_order(draft("ORD-1-AAAAAAAAA")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateOrderNumber(_)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_draft_rejected() {
        let repo = InMemoryOrderRepository::new();
        let mut empty = draft("ORD-1-AAAAAAAAA");
        empty.items.clear();
        assert!(matches!(
            repo.create_order(empty).await,
            Err(RepositoryError::Validation(_))
        ));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_order() {
        let repo = InMemoryOrderRepository::new();
        let lookup = OrderLookup::Id(OrderId::generate());
        assert!(matches!(
            repo.get_order(&lookup).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_rejected_update_is_not_stored() {
        let repo = InMemoryOrderRepository::new();
        let created = repo.create_order(draft("ORD-1-AAAAAAAAA")).await.unwrap();
        let lookup = OrderLookup::Id(created.id);

        let err = repo
            .update_order_status(
                &lookup,
                StatusUpdate {
                    status: OrderStatus::Shipped,
                    step_index: Some(4),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Lifecycle(LifecycleError::StepOutOfOrder { .. })
        ));
        assert_eq!(repo.get_order(&lookup).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_stats_exclude_cancelled_revenue() {
        let repo = InMemoryOrderRepository::new();
        repo.create_order(draft("ORD-1-AAAAAAAAA")).await.unwrap();
        let second = repo.create_order(draft("ORD-2-BBBBBBBBB")).await.unwrap();
        repo.update_order_status(
            &OrderLookup::Id(second.id),
            StatusUpdate {
                status: OrderStatus::Cancelled,
                step_index: None,
            },
        )
        .await
        .unwrap();

        let stats = repo.order_stats().await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.total_revenue, Money::from_cents(3839));
    }

    #[tokio::test]
    async fn test_unavailable() {
        let repo = InMemoryOrderRepository::new();
        repo.set_unavailable(true);
        assert!(matches!(repo.ping().await, Err(RepositoryError::Unavailable(_))));
        repo.set_unavailable(false);
        assert!(repo.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_catalog_lookup() {
        let catalog = InMemoryCatalog::new();
        let id = ProductId::new("42").unwrap();
        assert!(catalog.product(&id).await.unwrap().is_none());

        catalog
            .insert(CatalogProduct {
                id: id.clone(),
                name: "Mug".to_string(),
                price: Money::from_cents(1200),
                original_price: None,
                image: None,
                stock: Some(4),
            })
            .await;
        assert_eq!(catalog.product(&id).await.unwrap().unwrap().name, "Mug");
    }
}
