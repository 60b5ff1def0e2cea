//! tokoctl-core: storefront domain and order placement
//!
//! Defines users, products and orders once, the [`store::Store`] seam that
//! persistence backends implement, and [`placement::place_order`], which
//! checks stock and records an order in a single unit of work.

pub mod config;
pub mod error;
pub mod models;
pub mod placement;
pub mod store;

pub use config::TokoConfig;
pub use error::{OrderError, OrderErrorKind, StoreError};
pub use models::{Address, NewOrder, NewProduct, NewUser, Order, Product, Quantity, User, UserPatch};
pub use placement::{place_order, PlaceOrder};
pub use store::{MemoryStore, Store, UnitOfWork};
