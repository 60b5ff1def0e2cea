//! Order repository - read side only
//!
//! Orders are written exclusively by [`crate::db::PgStore`] during placement.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};

use tokoctl_core::models::Order;

use super::DbError;
use crate::db::pagination::{Paginated, Pagination};

pub(crate) const ORDER_COLUMNS: &str =
    "id, user_id, product_id, quantity, total_price, created_at";

/// Order record from database
#[derive(Debug, Clone, FromRow)]
pub(crate) struct OrderRow {
    id: i64,
    user_id: i64,
    product_id: i64,
    quantity: i32,
    total_price: i64,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            quantity: row.quantity,
            total_price: row.total_price,
            created_at: row.created_at,
        }
    }
}

/// Which foreign key a listing filters on
#[derive(Debug, Clone, Copy)]
enum OrderOwner {
    User,
    Product,
}

impl OrderOwner {
    fn column(self) -> &'static str {
        match self {
            Self::User => "user_id",
            Self::Product => "product_id",
        }
    }
}

/// Order repository
pub struct OrderRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> Result<Order, DbError> {
        let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
        let row: OrderRow = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("order", id))?;
        Ok(row.into())
    }

    /// Orders placed by a user, newest first.
    pub async fn list_for_user(
        &self,
        user_id: i64,
        page: Pagination,
    ) -> Result<Paginated<Order>, DbError> {
        self.list_by(OrderOwner::User, user_id, page).await
    }

    /// Orders for a product, newest first.
    pub async fn list_for_product(
        &self,
        product_id: i64,
        page: Pagination,
    ) -> Result<Paginated<Order>, DbError> {
        self.list_by(OrderOwner::Product, product_id, page).await
    }

    async fn list_by(
        &self,
        owner: OrderOwner,
        id: i64,
        page: Pagination,
    ) -> Result<Paginated<Order>, DbError> {
        let sql = format!(
            r#"
            SELECT {}, COUNT(*) OVER() AS total
            FROM orders
            WHERE {} = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            ORDER_COLUMNS,
            owner.column()
        );
        let rows = sqlx::query(&sql)
            .bind(id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let total = rows.first().map(|r| r.get::<i64, _>("total")).unwrap_or(0);
        let items = rows
            .iter()
            .map(|r| OrderRow::from_row(r).map(Order::from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }
}
