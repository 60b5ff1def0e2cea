//! Product commands

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use tokoctl_core::models::NewProduct;
use tokoctl_server::db::{Pagination, ProductRepo};

use super::CliContext;

#[derive(Parser, Debug)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProductsCommand {
    /// List products with their stock
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        per_page: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one product
    Show {
        /// Product id
        id: i64,
    },
    /// Create a product
    Add {
        #[arg(long)]
        name: String,
        /// Price in the smallest currency unit
        #[arg(long)]
        price: i64,
        /// Units in stock
        #[arg(long)]
        stock: i32,
        #[arg(long)]
        description: Option<String>,
    },
}

pub async fn run_products(ctx: &CliContext, args: ProductsArgs) -> Result<()> {
    let pool = ctx.pool().await?;
    let repo = ProductRepo::new(&pool);

    match args.command {
        ProductsCommand::List {
            page,
            per_page,
            json,
        } => {
            let result = repo.list(Pagination::new(page, per_page)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }
            for p in &result.items {
                println!("{:>6}  {:<30} {:>14} {:>6}", p.id, p.name, p.price, p.stock);
            }
            println!("page {} ({} products total)", result.page, result.total);
        }
        ProductsCommand::Show { id } => {
            let product = repo.get(id).await?;
            println!("{}", serde_json::to_string_pretty(&product)?);
        }
        ProductsCommand::Add {
            name,
            price,
            stock,
            description,
        } => {
            let mut product = NewProduct::new(name, price, stock);
            product.description = description;
            let created = repo
                .create(&product)
                .await
                .context("Failed to create product")?;
            println!("Created product {} with stock {}", created.id, created.stock);
        }
    }

    Ok(())
}
