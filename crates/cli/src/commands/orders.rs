//! Order operations for store staff.
//!
//! # Usage
//!
//! ```bash
//! # Show one order
//! shophub-cli orders show ORD-1760432400000-K3J9QZ2XA
//!
//! # Advance an order and mark tracking step 3 (Shipped) complete
//! shophub-cli orders advance ORD-1760432400000-K3J9QZ2XA --status shipped --step 3
//!
//! # Store-wide figures
//! shophub-cli orders stats
//! ```
//!
//! These talk to the repository directly and apply the same lifecycle rules
//! as the admin API.

use shophub_core::OrderStatus;
use shophub_storefront::db::{OrderLookup, OrderRepository, PgOrderRepository};
use shophub_storefront::models::{Order, StatusUpdate};

use super::{CommandError, connect};

async fn repository() -> Result<PgOrderRepository, CommandError> {
    Ok(PgOrderRepository::new(connect().await?))
}

fn parse_lookup(raw: &str) -> Result<OrderLookup, CommandError> {
    raw.parse()
        .map_err(|e: shophub_storefront::db::orders::InvalidOrderLookup| {
            CommandError::InvalidArgument(e.to_string())
        })
}

fn parse_status(raw: &str) -> Result<OrderStatus, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::InvalidArgument(format!("unknown status: {raw}")))
}

fn print_json(value: &impl serde::Serialize) -> Result<(), CommandError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}

fn log_order(order: &Order) {
    tracing::info!(
        order_number = %order.order_number,
        status = %order.status,
        current_step = ?order.tracking_steps.current_step(),
        total = %order.total,
        "Order"
    );
}

/// Print one order.
///
/// # Errors
///
/// Returns `CommandError` if the lookup is malformed or the order is missing.
pub async fn show(lookup: &str) -> Result<(), CommandError> {
    let lookup = parse_lookup(lookup)?;
    let order = repository().await?.get_order(&lookup).await?;
    log_order(&order);
    print_json(&order)
}

/// Move an order to `status`, optionally completing a tracking step.
///
/// # Errors
///
/// Returns `CommandError` if the arguments are malformed or the update
/// breaks the order lifecycle.
pub async fn advance(lookup: &str, status: &str, step: Option<usize>) -> Result<(), CommandError> {
    let lookup = parse_lookup(lookup)?;
    let update = StatusUpdate {
        status: parse_status(status)?,
        step_index: step,
    };

    let order = repository()
        .await?
        .update_order_status(&lookup, update)
        .await?;
    tracing::info!("Order updated");
    log_order(&order);
    Ok(())
}

/// Print store-wide order figures.
///
/// # Errors
///
/// Returns `CommandError` if the figures cannot be read.
pub async fn stats() -> Result<(), CommandError> {
    let stats = repository().await?.order_stats().await?;
    tracing::info!(
        total_orders = stats.total_orders,
        pending_orders = stats.pending_orders,
        total_revenue = %stats.total_revenue,
        "Order stats"
    );
    print_json(&stats)
}
