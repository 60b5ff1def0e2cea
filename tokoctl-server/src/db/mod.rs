//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - Connection pool with a small explicit limit, owned by the caller
//! - Rely on DB constraints (unique email, `stock >= 0`), handle conflicts
//! - Order placement runs in one transaction via [`PgStore`]

pub mod migrations;
pub mod pagination;
pub mod pool;
pub mod repos;
pub mod seed;
pub mod store;

pub use pagination::{Paginated, Pagination, PaginationParams};
pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
pub use store::{PgStore, PgUnitOfWork};
