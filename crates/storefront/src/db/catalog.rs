//! Catalog lookups.
//!
//! The catalog is owned elsewhere; the storefront only reads a product when
//! it is added to a cart or wishlist.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use shophub_core::{Money, ProductId};

use super::RepositoryError;
use crate::models::CatalogProduct;

const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");

/// Read access to the product catalog.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Look up a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the catalog cannot be read.
    async fn product(&self, id: &ProductId) -> Result<Option<CatalogProduct>, RepositoryError>;
}

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price: Decimal,
    original_price: Option<Decimal>,
    image: Option<String>,
    stock: Option<i32>,
}

impl TryFrom<ProductRow> for CatalogProduct {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let corrupt = |what: &str| RepositoryError::DataCorruption(format!("invalid {what} in database"));

        let id = ProductId::new(row.id).ok_or_else(|| corrupt("product id"))?;
        let price = Money::new(row.price).map_err(|_| corrupt("price"))?;
        let original_price = row
            .original_price
            .map(Money::new)
            .transpose()
            .map_err(|_| corrupt("original price"))?;
        let stock = row
            .stock
            .map(u32::try_from)
            .transpose()
            .map_err(|_| corrupt("stock"))?;

        Ok(Self {
            id,
            name: row.name,
            price,
            original_price,
            image: row.image,
            stock,
        })
    }
}

/// `PostgreSQL`-backed catalog reader.
#[derive(Debug, Clone)]
pub struct PgProductCatalog {
    pool: PgPool,
}

impl PgProductCatalog {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductCatalog for PgProductCatalog {
    async fn product(&self, id: &ProductId) -> Result<Option<CatalogProduct>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(GET_PRODUCT_SQL)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }
}
