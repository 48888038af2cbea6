//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::instrument;

use crate::db::OrderLookup;
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAdmin, RequireAuth};
use crate::models::{Order, STEP_LABELS, StatusUpdate};
use crate::state::AppState;

/// Days from placement to the delivery estimate shown with an order.
pub const DELIVERY_ESTIMATE_DAYS: u64 = 5;

/// An order plus its tracking progress.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    /// Index of the next tracking step to complete, `None` once all are done.
    pub current_step: Option<usize>,
    pub current_step_label: Option<&'static str>,
    pub estimated_delivery: Option<NaiveDate>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        let current_step = order.tracking_steps.current_step();
        let estimated_delivery = order
            .created_at
            .date_naive()
            .checked_add_days(Days::new(DELIVERY_ESTIMATE_DAYS));
        Self {
            current_step_label: current_step.and_then(|i| STEP_LABELS.get(i).copied()),
            estimated_delivery,
            current_step,
            order,
        }
    }
}

fn parse_lookup(raw: &str) -> Result<OrderLookup> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("order {raw}")))
}

/// Orders for the logged-in user, newest first. Admins see every order.
#[instrument(skip_all, fields(user_id = user.id.as_i32()))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<OrderView>>> {
    let orders = state.order_service().list_for(&user).await?;
    Ok(Json(orders.into_iter().map(OrderView::from).collect()))
}

/// One order, by order number or ID.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(lookup): Path<String>,
) -> Result<Json<OrderView>> {
    let lookup = parse_lookup(&lookup)?;
    let order = state
        .order_service()
        .find_for_viewer(&lookup, user.as_ref())
        .await?;
    Ok(Json(OrderView::from(order)))
}

/// Move an order along its lifecycle.
#[instrument(skip(state, admin, update), fields(status = %update.status, step_index = ?update.step_index))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(lookup): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<OrderView>> {
    let lookup = parse_lookup(&lookup)?;
    let order = state
        .order_service()
        .update_status(&admin, &lookup, update)
        .await?;
    Ok(Json(OrderView::from(order)))
}
