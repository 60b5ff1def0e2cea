//! In-memory order placement walkthrough
//!
//! Runs the same `place_order` used by the server against a `MemoryStore`
//! seeded with the sample products, so no database is needed.

use anyhow::{Context, Result};
use clap::Parser;
use futures::future::join_all;
use serde::Serialize;

use tokoctl_core::models::NewProduct;
use tokoctl_core::{place_order, MemoryStore, OrderErrorKind, PlaceOrder};
use tokoctl_server::db::seed::sample_products;

#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Stock of the flash-sale product
    #[arg(long, default_value_t = 5)]
    pub stock: i32,

    /// Number of concurrent single-unit buyers
    #[arg(long, default_value_t = 12)]
    pub buyers: usize,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Outcome of one attempted placement
#[derive(Debug, Serialize)]
pub struct Attempt {
    pub label: &'static str,
    /// `"ok"` or the error kind
    pub outcome: String,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub attempts: Vec<Attempt>,
    pub flash_sale_stock: i32,
    pub buyers: usize,
    pub succeeded: usize,
    pub out_of_stock: usize,
    pub remaining_stock: i32,
}

pub async fn run_demo(args: DemoArgs) -> Result<()> {
    let report = demo(&args).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for attempt in &report.attempts {
        println!("{:<24} {:<20} {}", attempt.label, attempt.outcome, attempt.detail);
    }
    println!(
        "flash sale: {} buyers, stock {} -> {} succeeded, {} out of stock, {} left",
        report.buyers,
        report.flash_sale_stock,
        report.succeeded,
        report.out_of_stock,
        report.remaining_stock
    );
    Ok(())
}

async fn demo(args: &DemoArgs) -> Result<DemoReport> {
    let store = MemoryStore::new();
    let mut ids = Vec::new();
    for product in sample_products() {
        ids.push(store.insert_product(product).await?.id);
    }
    let laptop = ids[0];

    let scripted = [
        ("buy 2 laptops", laptop, 2),
        ("buy 0 laptops", laptop, 0),
        ("buy 100 laptops", laptop, 100),
        ("buy unknown product", 9_999, 1),
    ];
    let mut attempts = Vec::with_capacity(scripted.len());
    for (label, product_id, quantity) in scripted {
        let request = PlaceOrder {
            user_id: 1,
            product_id,
            quantity,
        };
        let attempt = match place_order(&store, request).await {
            Ok(order) => Attempt {
                label,
                outcome: "ok".into(),
                detail: format!("order {} total {}", order.id, order.total_price),
            },
            Err(e) => Attempt {
                label,
                outcome: e.kind().to_string(),
                detail: e.to_string(),
            },
        };
        attempts.push(attempt);
    }

    let sale = store
        .insert_product(NewProduct::new("Flash sale", 100_000, args.stock))
        .await
        .context("Invalid flash-sale stock")?;
    let sale_id = sale.id;

    let buyers = (0..args.buyers).map(|i| {
        let store = store.clone();
        tokio::spawn(async move {
            place_order(
                &store,
                PlaceOrder {
                    user_id: i as i64 + 1,
                    product_id: sale_id,
                    quantity: 1,
                },
            )
            .await
        })
    });
    let mut succeeded = 0;
    let mut out_of_stock = 0;
    for joined in join_all(buyers).await {
        match joined.context("buyer task panicked")? {
            Ok(_) => succeeded += 1,
            Err(e) if e.kind() == OrderErrorKind::InsufficientStock => out_of_stock += 1,
            Err(e) => return Err(e).context("unexpected placement failure"),
        }
    }

    let remaining_stock = store
        .product(sale_id)
        .await
        .map(|p| p.stock)
        .context("flash-sale product vanished")?;

    Ok(DemoReport {
        attempts,
        flash_sale_stock: args.stock,
        buyers: args.buyers,
        succeeded,
        out_of_stock,
        remaining_stock,
    })
}
