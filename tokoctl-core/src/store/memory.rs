//! In-process store
//!
//! Units of work run one at a time: `begin` takes an owned lock on the whole
//! state and stages changes on a copy, which `commit` publishes. Dropping the
//! unit of work releases the lock and discards the copy.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Store, UnitOfWork};
use crate::error::StoreError;
use crate::models::{NewOrder, NewProduct, Order, Product, ValidationError};

#[derive(Debug, Clone, Default)]
struct State {
    products: BTreeMap<i64, Product>,
    orders: Vec<Order>,
    last_product_id: i64,
    last_order_id: i64,
}

/// Store backed by process memory. Cloning shares the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a product outside any unit of work (seed data).
    pub async fn insert_product(&self, new: NewProduct) -> Result<Product, ValidationError> {
        new.validate()?;
        let mut state = self.state.lock().await;
        state.last_product_id += 1;
        let now = Utc::now();
        let product = Product {
            id: state.last_product_id,
            name: new.name,
            description: new.description,
            price: new.price,
            stock: new.stock,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    /// Committed view of a product.
    pub async fn product(&self, product_id: i64) -> Option<Product> {
        self.state.lock().await.products.get(&product_id).cloned()
    }

    /// Committed orders in insertion order.
    pub async fn orders(&self) -> Vec<Order> {
        self.state.lock().await.orders.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTx { guard, working })
    }
}

/// Unit of work over a [`MemoryStore`]
pub struct MemoryTx {
    guard: OwnedMutexGuard<State>,
    working: State,
}

#[async_trait]
impl UnitOfWork for MemoryTx {
    async fn product_for_update(&mut self, product_id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self.working.products.get(&product_id).cloned())
    }

    async fn insert_order(&mut self, order: &NewOrder) -> Result<Order, StoreError> {
        self.working.last_order_id += 1;
        let order = Order {
            id: self.working.last_order_id,
            user_id: order.user_id,
            product_id: order.product_id,
            quantity: order.quantity.get(),
            total_price: order.total_price,
            created_at: Utc::now(),
        };
        self.working.orders.push(order.clone());
        Ok(order)
    }

    async fn set_stock(&mut self, product_id: i64, stock: i32) -> Result<(), StoreError> {
        if stock < 0 {
            return Err(StoreError::msg(format!(
                "stock for product {} would become negative",
                product_id
            )));
        }
        let product = self
            .working
            .products
            .get_mut(&product_id)
            .ok_or_else(|| StoreError::msg(format!("product {} vanished", product_id)))?;
        product.stock = stock;
        product.updated_at = Utc::now();
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        let MemoryTx { mut guard, working } = self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}
