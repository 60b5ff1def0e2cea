//! tokoctl CLI - storefront database tool
//!
//! Entry point for the `tokoctl` binary:
//! - Schema migrations and sample data (`migrate`, `seed`)
//! - User and product management (`users`, `products`)
//! - Order placement with stock check (`order place`)
//! - HTTP API server (`serve`)
//! - An in-memory walkthrough that needs no database (`demo`)

use anyhow::Result;
use clap::{Parser, Subcommand};

use tokoctl_core::config::load_dotenv;
use tokoctl_core::TokoConfig;

mod commands;
mod tracing_setup;

use commands::CliContext;

#[derive(Parser, Debug)]
#[command(
    name = "tokoctl",
    author,
    version,
    about = "Storefront database tool: users, products and stock-checked orders",
    long_about = "Manage a PostgreSQL-backed storefront. Orders are placed in a single \
                  transaction that checks stock, records the order and decrements stock."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Database URL (overrides config file)
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or update the database schema
    Migrate,
    /// Insert sample users and products
    Seed,
    /// Manage users (list, add, upsert, rename, delete)
    Users(commands::users::UsersArgs),
    /// Manage products (list, add, show)
    Products(commands::products::ProductsArgs),
    /// Place and inspect orders
    Order(commands::order::OrderArgs),
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Walk through order placement against an in-memory store
    Demo(commands::demo::DemoArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    load_dotenv();

    let ctx = CliContext {
        config: TokoConfig::load()?,
        database_url: cli.database_url,
    };

    match cli.command {
        Commands::Migrate => commands::run_migrate(&ctx).await?,
        Commands::Seed => commands::run_seed(&ctx).await?,
        Commands::Users(args) => commands::run_users(&ctx, args).await?,
        Commands::Products(args) => commands::run_products(&ctx, args).await?,
        Commands::Order(args) => commands::run_order(&ctx, args).await?,
        Commands::Serve(args) => commands::run_serve(&ctx, args).await?,
        Commands::Demo(args) => commands::run_demo(args).await?,
    }

    Ok(())
}
