//! Database operations for the storefront `PostgreSQL`.
//!
//! # Database: `shophub_storefront`
//!
//! ## Tables
//!
//! - `storefront.product` - Catalog read model (owned by the catalog service)
//! - `storefront.customer_order` - Orders with JSONB items, shipping info and tracking steps
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p shophub-cli -- migrate
//! ```
//!
//! Every repository has a `PostgreSQL` implementation and an in-memory one
//! from [`memory`], used by tests and local runs without a database.

pub mod catalog;
pub mod memory;
pub mod orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use shophub_core::OrderNumber;

use crate::models::LifecycleError;

pub use catalog::{PgProductCatalog, ProductCatalog};
pub use memory::{InMemoryCatalog, InMemoryOrderRepository};
pub use orders::{OrderFilter, OrderLookup, OrderRepository, OrderStats, PgOrderRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// The database could not be reached in time.
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Another order already uses this number.
    #[error("duplicate order number: {0}")]
    DuplicateOrderNumber(OrderNumber),

    /// The repository rejected the submitted data.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A status update broke the order lifecycle rules.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(e.to_string())
            }
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Database(other),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
