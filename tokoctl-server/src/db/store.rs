//! PostgreSQL implementation of the order placement store
//!
//! A unit of work is one sqlx transaction. `product_for_update` takes a row
//! lock with `SELECT ... FOR UPDATE`, so placements against the same product
//! queue behind each other and each sees the stock the previous one left.
//! Dropping an uncommitted [`PgUnitOfWork`] rolls the transaction back.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use tokoctl_core::models::{NewOrder, Order, Product};
use tokoctl_core::store::{Store, UnitOfWork};
use tokoctl_core::StoreError;

use super::repos::orders::{OrderRow, ORDER_COLUMNS};
use super::repos::products::{ProductRow, PRODUCT_COLUMNS};

/// [`Store`] over a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    type Tx = PgUnitOfWork;

    async fn begin(&self) -> Result<PgUnitOfWork, StoreError> {
        let tx = self.pool.begin().await.map_err(StoreError::backend)?;
        Ok(PgUnitOfWork { tx })
    }
}

/// Open PostgreSQL transaction
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn product_for_update(&mut self, product_id: i64) -> Result<Option<Product>, StoreError> {
        let sql = format!(
            "SELECT {} FROM products WHERE id = $1 FOR UPDATE",
            PRODUCT_COLUMNS
        );
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(product_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.map(Product::from))
    }

    async fn insert_order(&mut self, order: &NewOrder) -> Result<Order, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO orders (user_id, product_id, quantity, total_price)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );
        let row: OrderRow = sqlx::query_as(&sql)
            .bind(order.user_id)
            .bind(order.product_id)
            .bind(order.quantity.get())
            .bind(order.total_price)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.into())
    }

    async fn set_stock(&mut self, product_id: i64, stock: i32) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE products SET stock = $2, updated_at = NOW() WHERE id = $1")
            .bind(product_id)
            .bind(stock)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::backend)?;

        if result.rows_affected() != 1 {
            return Err(StoreError::msg(format!(
                "stock update for product {} touched {} rows",
                product_id,
                result.rows_affected()
            )));
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(StoreError::backend)
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(StoreError::backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::{OrderRepo, ProductRepo};
    use crate::db::Pagination;
    use futures::future::join_all;
    use tokoctl_core::models::NewProduct;
    use tokoctl_core::{place_order, OrderErrorKind, PlaceOrder};

    // Run with: DATABASE_URL=postgres://... cargo test -p tokoctl-server -- --ignored

    async fn setup(stock: i32) -> (PgStore, Product) {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool_with_options(&url, 10).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();
        let product = ProductRepo::new(&pool)
            .create(&NewProduct::new("Laptop", 15_000_000, stock))
            .await
            .unwrap();
        (PgStore::new(pool), product)
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn places_order_in_postgres() {
        let (store, product) = setup(10).await;

        let order = place_order(
            &store,
            PlaceOrder {
                user_id: 1,
                product_id: product.id,
                quantity: 2,
            },
        )
        .await
        .unwrap();

        assert_eq!(order.total_price, 30_000_000);
        let after = ProductRepo::new(store.pool()).get(product.id).await.unwrap();
        assert_eq!(after.stock, 8);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn dropped_unit_of_work_rolls_back() {
        let (store, product) = setup(5).await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.set_stock(product.id, 0).await.unwrap();
        }

        let after = ProductRepo::new(store.pool()).get(product.id).await.unwrap();
        assert_eq!(after.stock, 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires database"]
    async fn row_lock_serializes_concurrent_orders() {
        let (store, product) = setup(3).await;
        let product_id = product.id;

        let attempts = (0..8).map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                place_order(
                    &store,
                    PlaceOrder {
                        user_id: i + 1,
                        product_id,
                        quantity: 1,
                    },
                )
                .await
            })
        });
        let results: Vec<_> = join_all(attempts)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.kind() == OrderErrorKind::InsufficientStock));

        let after = ProductRepo::new(store.pool()).get(product_id).await.unwrap();
        assert_eq!(after.stock, 0);
        let orders = OrderRepo::new(store.pool())
            .list_for_product(product_id, Pagination::default())
            .await
            .unwrap();
        assert_eq!(orders.total, 3);
    }
}
