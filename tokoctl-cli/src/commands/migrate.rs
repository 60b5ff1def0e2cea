//! Schema and sample data commands

use anyhow::{Context, Result};

use tokoctl_server::db::{migrations, seed};

use super::CliContext;

/// Apply the idempotent schema migrations.
pub async fn run_migrate(ctx: &CliContext) -> Result<()> {
    let pool = ctx.pool().await?;
    migrations::run(&pool)
        .await
        .context("Failed to apply migrations")?;
    println!("Schema is up to date");
    Ok(())
}

/// Insert sample users and products. Safe to run more than once.
pub async fn run_seed(ctx: &CliContext) -> Result<()> {
    let pool = ctx.pool().await?;
    migrations::run(&pool)
        .await
        .context("Failed to apply migrations")?;

    let report = seed::run(&pool).await.context("Failed to seed sample data")?;
    println!(
        "Seeded {} users and {} products",
        report.users, report.products
    );
    Ok(())
}
