//! Sample data: two users and two products

use sqlx::PgPool;

use tokoctl_core::models::{Address, NewProduct, NewUser};

use super::repos::{DbError, ProductRepo, UserRepo};

/// What a seed run wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub products: usize,
}

pub fn sample_users() -> Vec<NewUser> {
    vec![
        NewUser::new("Budi Santoso", "budi.santoso@example.com", "rahasia123").with_address(
            Address {
                street: "Jl. Merdeka No. 123".into(),
                city: "Jakarta".into(),
                state: "DKI Jakarta".into(),
                zip_code: "10110".into(),
            },
        ),
        NewUser::new("Siti Aminah", "siti.aminah@example.com", "rahasia456").with_address(
            Address {
                street: "Jl. Sudirman No. 45".into(),
                city: "Bandung".into(),
                state: "Jawa Barat".into(),
                zip_code: "40235".into(),
            },
        ),
    ]
}

pub fn sample_products() -> Vec<NewProduct> {
    vec![
        NewProduct::new("Laptop", 15_000_000, 10)
            .with_description("Laptop high-end dengan spesifikasi tinggi"),
        NewProduct::new("Smartphone", 5_000_000, 20)
            .with_description("Smartphone dengan kamera berkualitas tinggi"),
    ]
}

/// Insert the sample data.
///
/// Users are upserted by email, so a second run refreshes them. Products are
/// only inserted into an empty table.
pub async fn run(pool: &PgPool) -> Result<SeedReport, DbError> {
    let users = UserRepo::new(pool);
    let mut report = SeedReport::default();

    for user in sample_users() {
        users.upsert_by_email(&user).await?;
        report.users += 1;
    }

    let products = ProductRepo::new(pool);
    if products.count().await? == 0 {
        report.products = products.create_batch(&sample_products()).await?.len();
    } else {
        tracing::info!("products already present, skipping product seed");
    }

    tracing::info!(users = report.users, products = report.products, "seed complete");
    Ok(report)
}
