//! Order repository.
//!
//! Orders are written once at checkout and afterwards only change through
//! [`OrderRepository::update_order_status`].

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use shophub_core::{Money, OrderId, OrderNumber, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::{
    Order, OrderDraft, OrderItemSnapshot, ShippingInfo, StatusUpdate, StepOutcome, TrackingSteps,
};

const INSERT_ORDER_SQL: &str = include_str!("sql/insert_order.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const LOCK_ORDER_SQL: &str = include_str!("sql/lock_order.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("sql/update_order_status.sql");
const ORDER_STATS_SQL: &str = include_str!("sql/order_stats.sql");

// =============================================================================
// Lookup & Filter Types
// =============================================================================

/// How to find one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderLookup {
    Id(OrderId),
    Number(OrderNumber),
}

impl OrderLookup {
    fn as_binds(&self) -> (Option<Uuid>, Option<&str>) {
        match self {
            Self::Id(id) => (Some(id.as_uuid()), None),
            Self::Number(number) => (None, Some(number.as_str())),
        }
    }

    /// Whether `order` is the one this lookup names.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            Self::Id(id) => order.id == *id,
            Self::Number(number) => order.order_number == *number,
        }
    }
}

impl std::fmt::Display for OrderLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// A path segment that is neither an order number nor an order ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not an order number or order id: {0}")]
pub struct InvalidOrderLookup(pub String);

impl FromStr for OrderLookup {
    type Err = InvalidOrderLookup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with(OrderNumber::PREFIX) {
            return OrderNumber::parse(s)
                .map(Self::Number)
                .map_err(|_| InvalidOrderLookup(s.to_owned()));
        }
        OrderId::from_str(s)
            .map(Self::Id)
            .map_err(|_| InvalidOrderLookup(s.to_owned()))
    }
}

/// Which orders to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Only orders placed by this user. `None` lists every order.
    pub user_id: Option<UserId>,
}

impl OrderFilter {
    #[must_use]
    pub const fn all() -> Self {
        Self { user_id: None }
    }

    #[must_use]
    pub const fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }
}

/// Store-wide order figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub total_orders: u64,
    pub pending_orders: u64,
    /// Sum of order totals, excluding cancelled orders.
    pub total_revenue: Money,
}

// =============================================================================
// Repository Trait
// =============================================================================

/// Persistent order storage.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DuplicateOrderNumber` if the number is
    /// taken, `RepositoryError::Validation` if the draft is rejected, or
    /// `RepositoryError::Unavailable` if the store cannot be reached.
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, RepositoryError>;

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order matches.
    async fn get_order(&self, lookup: &OrderLookup) -> Result<Order, RepositoryError>;

    /// List orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read.
    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, RepositoryError>;

    /// Apply a status update to a stored order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order matches, or
    /// `RepositoryError::Lifecycle` if the update breaks the lifecycle rules
    /// (in which case nothing is written).
    async fn update_order_status(
        &self,
        lookup: &OrderLookup,
        update: StatusUpdate,
    ) -> Result<Order, RepositoryError>;

    /// Store-wide figures for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read.
    async fn order_stats(&self) -> Result<OrderStats, RepositoryError>;

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if it is not.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Checks every implementation applies before inserting a draft.
pub(crate) fn validate_draft(draft: &OrderDraft) -> Result<(), RepositoryError> {
    if draft.items.is_empty() {
        return Err(RepositoryError::Validation(
            "order must contain at least one item".to_owned(),
        ));
    }
    if draft.shipping_info.name.trim().is_empty() {
        return Err(RepositoryError::Validation(
            "shipping name is required".to_owned(),
        ));
    }
    Ok(())
}

/// Apply `update` to `order` in place, logging ignored step indexes.
pub(crate) fn apply_update(
    order: &mut Order,
    update: StatusUpdate,
    now: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    let outcome = order.apply_status_update(update, now)?;
    if outcome == Some(StepOutcome::OutOfRange) {
        tracing::warn!(
            order_number = %order.order_number,
            step_index = ?update.step_index,
            steps = order.tracking_steps.len(),
            "Ignoring out-of-range tracking step"
        );
    }
    Ok(())
}

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    user_id: Option<i32>,
    items: serde_json::Value,
    subtotal: Decimal,
    shipping: Decimal,
    tax: Decimal,
    discount: Decimal,
    coupon_code: Option<String>,
    total: Decimal,
    status: String,
    shipping_info: serde_json::Value,
    tracking_steps: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn money_column(name: &str, value: Decimal) -> Result<Money, RepositoryError> {
    Money::new(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {name} in database: {e}")))
}

fn json_column<T: serde::de::DeserializeOwned>(
    name: &str,
    value: serde_json::Value,
) -> Result<T, RepositoryError> {
    serde_json::from_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {name} in database: {e}")))
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let order_number = OrderNumber::parse(&row.order_number).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order number in database: {e}"))
        })?;
        let status = row.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;
        let items: Vec<OrderItemSnapshot> = json_column("items", row.items)?;
        let shipping_info: ShippingInfo = json_column("shipping info", row.shipping_info)?;
        let tracking_steps: TrackingSteps = json_column("tracking steps", row.tracking_steps)?;

        Ok(Self {
            id: OrderId::from_uuid(row.id),
            order_number,
            user_id: row.user_id.map(UserId::new),
            items,
            subtotal: money_column("subtotal", row.subtotal)?,
            shipping: money_column("shipping", row.shipping)?,
            tax: money_column("tax", row.tax)?,
            discount: money_column("discount", row.discount)?,
            coupon_code: row.coupon_code,
            total: money_column("total", row.total)?,
            status,
            shipping_info,
            tracking_steps,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderStatsRow {
    total_orders: i64,
    pending_orders: i64,
    total_revenue: Decimal,
}

impl TryFrom<OrderStatsRow> for OrderStats {
    type Error = RepositoryError;

    fn try_from(row: OrderStatsRow) -> Result<Self, Self::Error> {
        let count = |name: &str, value: i64| {
            u64::try_from(value).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid {name} count: {e}"))
            })
        };
        Ok(Self {
            total_orders: count("order", row.total_orders)?,
            pending_orders: count("pending order", row.pending_orders)?,
            total_revenue: money_column("revenue", row.total_revenue)?,
        })
    }
}

fn to_json<T: Serialize>(name: &str, value: &T) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(value)
        .map_err(|e| RepositoryError::Validation(format!("cannot encode {name}: {e}")))
}

// =============================================================================
// PostgreSQL Repository
// =============================================================================

/// `PostgreSQL`-backed order repository.
#[derive(Debug, Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, RepositoryError> {
        validate_draft(&draft)?;

        let items = to_json("items", &draft.items)?;
        let shipping_info = to_json("shipping info", &draft.shipping_info)?;
        let tracking_steps = to_json("tracking steps", &draft.tracking_steps)?;

        let row = sqlx::query_as::<_, OrderRow>(INSERT_ORDER_SQL)
            .bind(OrderId::generate().as_uuid())
            .bind(draft.order_number.as_str())
            .bind(draft.user_id.map(|id| id.as_i32()))
            .bind(Json(items))
            .bind(draft.subtotal.amount())
            .bind(draft.shipping.amount())
            .bind(draft.tax.amount())
            .bind(draft.discount.amount())
            .bind(draft.coupon_code.as_deref())
            .bind(draft.total.amount())
            .bind(OrderStatus::Pending.as_str())
            .bind(Json(shipping_info))
            .bind(Json(tracking_steps))
            .bind(draft.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e {
                    if db_err.is_unique_violation() {
                        return RepositoryError::DuplicateOrderNumber(draft.order_number.clone());
                    }
                    if db_err.is_check_violation() {
                        return RepositoryError::Validation(db_err.message().to_owned());
                    }
                }
                RepositoryError::from(e)
            })?;

        row.try_into()
    }

    async fn get_order(&self, lookup: &OrderLookup) -> Result<Order, RepositoryError> {
        let (id, number) = lookup.as_binds();
        let row = sqlx::query_as::<_, OrderRow>(GET_ORDER_SQL)
            .bind(id)
            .bind(number)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(LIST_ORDERS_SQL)
            .bind(filter.user_id.map(|id| id.as_i32()))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn update_order_status(
        &self,
        lookup: &OrderLookup,
        update: StatusUpdate,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (id, number) = lookup.as_binds();
        let row = sqlx::query_as::<_, OrderRow>(LOCK_ORDER_SQL)
            .bind(id)
            .bind(number)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let mut order = Order::try_from(row)?;
        // Dropping `tx` on error rolls back and releases the row lock.
        apply_update(&mut order, update, Utc::now())?;

        let tracking_steps = to_json("tracking steps", &order.tracking_steps)?;
        let row = sqlx::query_as::<_, OrderRow>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.id.as_uuid())
            .bind(order.status.as_str())
            .bind(Json(tracking_steps))
            .bind(order.updated_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        row.try_into()
    }

    async fn order_stats(&self) -> Result<OrderStats, RepositoryError> {
        let row = sqlx::query_as::<_, OrderStatsRow>(ORDER_STATS_SQL)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
