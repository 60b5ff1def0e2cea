//! Order placement with inventory check
//!
//! Check stock, price the order, write it and decrement stock inside one
//! unit of work. Stock is read through [`UnitOfWork::product_for_update`] so
//! the check and the decrement see the same row version.

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::OrderError;
use crate::models::{NewOrder, Order, Quantity, ValidationError};
use crate::store::{Store, UnitOfWork};

/// Caller-supplied placement request. `quantity` is unchecked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PlaceOrder {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

/// Place an order.
///
/// On success exactly one order row exists and the product's stock has
/// dropped by the ordered quantity. On any error neither happened.
/// Not idempotent: the same request twice creates two orders.
///
/// # Example
///
/// ```
/// use tokoctl_core::models::NewProduct;
/// use tokoctl_core::placement::{place_order, PlaceOrder};
/// use tokoctl_core::store::MemoryStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let laptop = store.insert_product(NewProduct::new("Laptop", 15_000_000, 10)).await?;
///
/// let order = place_order(&store, PlaceOrder { user_id: 1, product_id: laptop.id, quantity: 2 }).await?;
/// assert_eq!(order.total_price, 30_000_000);
/// assert_eq!(store.product(laptop.id).await.unwrap().stock, 8);
/// # Ok(())
/// # }
/// ```
pub async fn place_order<S: Store>(store: &S, request: PlaceOrder) -> Result<Order, OrderError> {
    let quantity = Quantity::new(request.quantity)?;

    let mut tx = store.begin().await?;
    match place_in(&mut tx, &request, quantity).await {
        Ok(order) => {
            tx.commit().await?;
            info!(
                order_id = order.id,
                user_id = order.user_id,
                product_id = order.product_id,
                quantity = order.quantity,
                total_price = order.total_price,
                "order placed"
            );
            Ok(order)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback after failed placement also failed");
            }
            debug!(
                product_id = request.product_id,
                quantity = request.quantity,
                kind = %err.kind(),
                "order rejected"
            );
            Err(err)
        }
    }
}

async fn place_in<T: UnitOfWork>(
    tx: &mut T,
    request: &PlaceOrder,
    quantity: Quantity,
) -> Result<Order, OrderError> {
    let product = tx
        .product_for_update(request.product_id)
        .await?
        .ok_or(OrderError::NotFound {
            product_id: request.product_id,
        })?;

    if product.stock < quantity.get() {
        return Err(OrderError::InsufficientStock {
            product_id: product.id,
            requested: quantity.get(),
            available: product.stock,
        });
    }

    let total_price = quantity
        .total_for(product.price)
        .ok_or(ValidationError::OutOfRange {
            field: "quantity",
            value: request.quantity,
            reason: "makes the total price overflow",
        })?;

    let order = tx
        .insert_order(&NewOrder {
            user_id: request.user_id,
            product_id: product.id,
            quantity,
            total_price,
        })
        .await?;

    tx.set_stock(product.id, product.stock - quantity.get()).await?;

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OrderErrorKind, StoreError};
    use crate::models::{NewProduct, Product};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    async fn laptop_store(stock: i32) -> (MemoryStore, i64) {
        let store = MemoryStore::new();
        let product = store
            .insert_product(NewProduct::new("Laptop", 15_000_000, stock))
            .await
            .unwrap();
        (store, product.id)
    }

    fn request(product_id: i64, quantity: i64) -> PlaceOrder {
        PlaceOrder {
            user_id: 1,
            product_id,
            quantity,
        }
    }

    #[tokio::test]
    async fn places_order_and_decrements_stock() {
        let (store, id) = laptop_store(10).await;

        let order = place_order(&store, request(id, 2)).await.unwrap();

        assert_eq!(order.quantity, 2);
        assert_eq!(order.total_price, 30_000_000);
        assert_eq!(order.user_id, 1);
        assert_eq!(store.product(id).await.unwrap().stock, 8);
        assert_eq!(store.orders().await, vec![order]);
    }

    #[tokio::test]
    async fn exact_stock_can_be_ordered() {
        let (store, id) = laptop_store(3).await;
        place_order(&store, request(id, 3)).await.unwrap();
        assert_eq!(store.product(id).await.unwrap().stock, 0);
    }

    #[tokio::test]
    async fn insufficient_stock_changes_nothing() {
        let (store, id) = laptop_store(1).await;

        let err = place_order(&store, request(id, 2)).await.unwrap_err();

        assert!(matches!(
            err,
            OrderError::InsufficientStock {
                requested: 2,
                available: 1,
                ..
            }
        ));
        assert_eq!(store.product(id).await.unwrap().stock, 1);
        assert!(store.orders().await.is_empty());
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let (store, _) = laptop_store(1).await;
        let err = place_order(&store, request(99, 1)).await.unwrap_err();
        assert_eq!(err.kind(), OrderErrorKind::NotFound);
    }

    #[tokio::test]
    async fn resubmission_creates_second_order() {
        let (store, id) = laptop_store(10).await;
        place_order(&store, request(id, 2)).await.unwrap();
        place_order(&store, request(id, 2)).await.unwrap();
        assert_eq!(store.orders().await.len(), 2);
        assert_eq!(store.product(id).await.unwrap().stock, 6);
    }

    #[tokio::test]
    async fn price_overflow_is_invalid_input() {
        let store = MemoryStore::new();
        let product = store
            .insert_product(NewProduct::new("Yacht", i64::MAX, 5))
            .await
            .unwrap();
        let err = place_order(&store, request(product.id, 2)).await.unwrap_err();
        assert_eq!(err.kind(), OrderErrorKind::InvalidInput);
        assert_eq!(store.product(product.id).await.unwrap().stock, 5);
    }

    /// Store that records whether `begin` was reached and fails chosen steps.
    #[derive(Default)]
    struct FlakyStore {
        began: AtomicBool,
        fail_set_stock: bool,
        fail_commit: bool,
        committed: Arc<AtomicBool>,
        rolled_back: Arc<AtomicBool>,
    }

    struct FlakyTx {
        fail_set_stock: bool,
        fail_commit: bool,
        committed: Arc<AtomicBool>,
        rolled_back: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Store for FlakyStore {
        type Tx = FlakyTx;

        async fn begin(&self) -> Result<FlakyTx, StoreError> {
            self.began.store(true, Ordering::SeqCst);
            Ok(FlakyTx {
                fail_set_stock: self.fail_set_stock,
                fail_commit: self.fail_commit,
                committed: Arc::clone(&self.committed),
                rolled_back: Arc::clone(&self.rolled_back),
            })
        }
    }

    #[async_trait]
    impl UnitOfWork for FlakyTx {
        async fn product_for_update(&mut self, id: i64) -> Result<Option<Product>, StoreError> {
            let now = chrono::Utc::now();
            Ok(Some(Product {
                id,
                name: "Laptop".into(),
                description: None,
                price: 100,
                stock: 5,
                created_at: now,
                updated_at: now,
            }))
        }

        async fn insert_order(&mut self, order: &NewOrder) -> Result<Order, StoreError> {
            Ok(Order {
                id: 1,
                user_id: order.user_id,
                product_id: order.product_id,
                quantity: order.quantity.get(),
                total_price: order.total_price,
                created_at: chrono::Utc::now(),
            })
        }

        async fn set_stock(&mut self, _id: i64, _stock: i32) -> Result<(), StoreError> {
            if self.fail_set_stock {
                return Err(StoreError::msg("serialization failure"));
            }
            Ok(())
        }

        async fn commit(self) -> Result<(), StoreError> {
            if self.fail_commit {
                return Err(StoreError::msg("connection lost during commit"));
            }
            self.committed.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn rollback(self) -> Result<(), StoreError> {
            self.rolled_back.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn invalid_quantity_never_touches_storage() {
        let store = FlakyStore::default();
        for quantity in [0, -1] {
            let err = place_order(&store, request(1, quantity)).await.unwrap_err();
            assert_eq!(err.kind(), OrderErrorKind::InvalidInput);
        }
        assert!(!store.began.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn failed_write_rolls_back() {
        let store = FlakyStore {
            fail_set_stock: true,
            ..Default::default()
        };
        let err = place_order(&store, request(1, 1)).await.unwrap_err();
        assert_eq!(err.kind(), OrderErrorKind::StorageFailure);
        assert!(err.is_retryable());
        assert!(store.rolled_back.load(Ordering::SeqCst));
        assert!(!store.committed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn failed_commit_is_storage_failure() {
        let store = FlakyStore {
            fail_commit: true,
            ..Default::default()
        };
        let err = place_order(&store, request(1, 1)).await.unwrap_err();
        assert_eq!(err.kind(), OrderErrorKind::StorageFailure);
    }
}
