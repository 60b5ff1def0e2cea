//! Order commands

use anyhow::{anyhow, Result};
use clap::{ArgGroup, Parser, Subcommand};

use tokoctl_core::{place_order, PlaceOrder};
use tokoctl_server::db::{OrderRepo, Pagination, PgStore};

use super::CliContext;

#[derive(Parser, Debug)]
pub struct OrderArgs {
    #[command(subcommand)]
    pub command: OrderCommand,
}

#[derive(Subcommand, Debug)]
pub enum OrderCommand {
    /// Place an order: checks stock, records the order, decrements stock
    Place {
        /// Ordering user id
        #[arg(long = "user")]
        user_id: i64,
        /// Product id
        #[arg(long = "product")]
        product_id: i64,
        /// Number of units (must be positive)
        #[arg(long, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Show one order
    Show {
        /// Order id
        id: i64,
    },
    /// List orders of a user or a product, newest first
    #[command(group(ArgGroup::new("owner").required(true).args(["user_id", "product_id"])))]
    List {
        #[arg(long = "user")]
        user_id: Option<i64>,
        #[arg(long = "product")]
        product_id: Option<i64>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        per_page: u32,
    },
}

pub async fn run_order(ctx: &CliContext, args: OrderArgs) -> Result<()> {
    let pool = ctx.pool().await?;

    match args.command {
        OrderCommand::Place {
            user_id,
            product_id,
            quantity,
        } => {
            let store = PgStore::new(pool);
            let request = PlaceOrder {
                user_id,
                product_id,
                quantity,
            };
            match place_order(&store, request).await {
                Ok(order) => println!("{}", serde_json::to_string_pretty(&order)?),
                Err(e) => {
                    let hint = if e.is_retryable() { " (retryable)" } else { "" };
                    return Err(anyhow!("order failed [{}]{}: {}", e.kind(), hint, e));
                }
            }
        }
        OrderCommand::Show { id } => {
            let order = OrderRepo::new(&pool).get(id).await?;
            println!("{}", serde_json::to_string_pretty(&order)?);
        }
        OrderCommand::List {
            user_id,
            product_id,
            page,
            per_page,
        } => {
            let repo = OrderRepo::new(&pool);
            let page = Pagination::new(page, per_page);
            let result = match (user_id, product_id) {
                (Some(user_id), _) => repo.list_for_user(user_id, page).await?,
                (None, Some(product_id)) => repo.list_for_product(product_id, page).await?,
                (None, None) => anyhow::bail!("either --user or --product is required"),
            };
            for o in &result.items {
                println!(
                    "{:>6}  user {:>5}  product {:>5}  qty {:>4}  total {:>14}  {}",
                    o.id,
                    o.user_id,
                    o.product_id,
                    o.quantity,
                    o.total_price,
                    o.created_at.to_rfc3339()
                );
            }
            println!("{} orders", result.total);
        }
    }

    Ok(())
}
