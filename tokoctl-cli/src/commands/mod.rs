//! Command implementations for tokoctl CLI

pub mod demo;
pub mod migrate;
pub mod order;
pub mod products;
pub mod serve;
pub mod users;

use anyhow::{Context, Result};
use sqlx::PgPool;

use tokoctl_core::TokoConfig;
use tokoctl_server::db::create_pool_with_options;

// Re-export main dispatcher functions for flat access from main.rs
pub use demo::run_demo;
pub use migrate::{run_migrate, run_seed};
pub use order::run_order;
pub use products::run_products;
pub use serve::run_serve;
pub use users::run_users;

/// Settings every database command needs
#[derive(Debug, Clone)]
pub struct CliContext {
    pub config: TokoConfig,
    /// `--database-url` / `DATABASE_URL`
    pub database_url: Option<String>,
}

impl CliContext {
    /// Connect with the configured pool size.
    pub async fn pool(&self) -> Result<PgPool> {
        let url = self.config.database_url(self.database_url.as_deref())?;
        create_pool_with_options(&url, self.config.database.max_connections)
            .await
            .context("Failed to create database pool")
    }
}
