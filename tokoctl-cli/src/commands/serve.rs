//! HTTP server command

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use tokoctl_server::db::migrations;
use tokoctl_server::http::{run_server, ServerConfig};

use super::CliContext;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: [server] bind, or 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,
}

/// Migrate, then run the HTTP server until shutdown.
pub async fn run_serve(ctx: &CliContext, args: ServeArgs) -> Result<()> {
    let pool = ctx.pool().await?;
    migrations::run(&pool)
        .await
        .context("Failed to apply migrations")?;

    let config = ServerConfig {
        bind_addr: args.bind.unwrap_or(ctx.config.server.bind),
        cors_permissive: args.cors_permissive || ctx.config.server.cors_permissive,
    };
    tracing::info!("Starting tokoctl server on {}", config.bind_addr);

    // Blocks until shutdown
    run_server(pool, config).await.context("Server error")?;

    Ok(())
}
