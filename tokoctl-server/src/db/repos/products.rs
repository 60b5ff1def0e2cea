//! Product repository
//!
//! Stock is never written here; only order placement changes it.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};

use tokoctl_core::models::{NewProduct, Product};

use super::DbError;
use crate::db::pagination::{Paginated, Pagination};

pub(crate) const PRODUCT_COLUMNS: &str =
    "id, name, description, price, stock, created_at, updated_at";

/// Product record from database
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    price: i64,
    stock: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Product repository
pub struct ProductRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, product: &NewProduct) -> Result<Product, DbError> {
        let mut created = self.create_batch(std::slice::from_ref(product)).await?;
        created.pop().ok_or(DbError::Sqlx(sqlx::Error::RowNotFound))
    }

    /// Insert many products in a single statement.
    pub async fn create_batch(&self, products: &[NewProduct]) -> Result<Vec<Product>, DbError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }
        for product in products {
            product.validate()?;
        }

        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO products (name, description, price, stock) ");
        qb.push_values(products, |mut row, product| {
            row.push_bind(product.name.clone())
                .push_bind(product.description.clone())
                .push_bind(product.price)
                .push_bind(product.stock);
        });
        qb.push(" RETURNING ").push(PRODUCT_COLUMNS);

        let rows: Vec<ProductRow> = qb.build_query_as().fetch_all(self.pool).await?;
        tracing::debug!(count = rows.len(), "products created");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<Product, DbError> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let row: ProductRow = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("product", id))?;
        Ok(row.into())
    }

    /// List products, oldest first.
    pub async fn list(&self, page: Pagination) -> Result<Paginated<Product>, DbError> {
        let sql = format!(
            "SELECT {}, COUNT(*) OVER() AS total FROM products ORDER BY id LIMIT $1 OFFSET $2",
            PRODUCT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let total = rows.first().map(|r| r.get::<i64, _>("total")).unwrap_or(0);
        let items = rows
            .iter()
            .map(|r| ProductRow::from_row(r).map(Product::from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Count of products, used to decide whether seeding is needed.
    pub async fn count(&self) -> Result<i64, DbError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
