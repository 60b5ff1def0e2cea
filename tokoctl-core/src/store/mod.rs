//! Persistence seam for order placement
//!
//! A [`Store`] hands out units of work. Everything read or written through a
//! [`UnitOfWork`] becomes visible atomically on [`UnitOfWork::commit`], or not
//! at all. Implementations must also discard the unit of work when it is
//! dropped without a commit, so a cancelled caller leaves no trace.

pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{NewOrder, Order, Product};

pub use memory::MemoryStore;

/// Source of units of work (a connection pool, an in-process store)
#[async_trait]
pub trait Store: Send + Sync {
    type Tx: UnitOfWork;

    /// Open a new unit of work.
    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// One all-or-nothing group of storage operations
#[async_trait]
pub trait UnitOfWork: Send {
    /// Read a product and hold it against concurrent writers until the unit
    /// of work ends.
    async fn product_for_update(&mut self, product_id: i64) -> Result<Option<Product>, StoreError>;

    /// Write a new order row.
    async fn insert_order(&mut self, order: &NewOrder) -> Result<Order, StoreError>;

    /// Overwrite a product's stock count.
    async fn set_stock(&mut self, product_id: i64, stock: i32) -> Result<(), StoreError>;

    /// Publish every change made through this unit of work.
    async fn commit(self) -> Result<(), StoreError>;

    /// Discard every change made through this unit of work.
    async fn rollback(self) -> Result<(), StoreError>;
}
