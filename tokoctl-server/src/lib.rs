//! tokoctl-server: PostgreSQL persistence and HTTP API
//!
//! The `db` module owns everything that talks to PostgreSQL (pool,
//! migrations, repositories and [`db::PgStore`], the transactional store
//! behind order placement). The `http` module exposes it over axum.

pub mod db;
pub mod http;

pub use db::{create_pool, create_pool_with_options, DbError, PgStore};
pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
