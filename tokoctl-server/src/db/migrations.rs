//! Schema migrations for users, products and orders
//!
//! Every statement is idempotent, so `run` is safe on every start.

use sqlx::PgPool;

/// Ordered schema statements
const STATEMENTS: &[(&str, &str)] = &[
    (
        "create users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            email VARCHAR(100) NOT NULL,
            password VARCHAR(255) NOT NULL,
            addr_street TEXT NOT NULL DEFAULT '',
            addr_city TEXT NOT NULL DEFAULT '',
            addr_state TEXT NOT NULL DEFAULT '',
            addr_zip_code TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            deleted_at TIMESTAMPTZ
        )
        "#,
    ),
    (
        "create products",
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            description TEXT,
            price BIGINT NOT NULL CHECK (price >= 0),
            stock INTEGER NOT NULL CHECK (stock >= 0),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "create orders",
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL,
            product_id BIGINT NOT NULL REFERENCES products(id),
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            total_price BIGINT NOT NULL CHECK (total_price >= 0),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "index users.email",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email)",
    ),
    (
        "index users.deleted_at",
        "CREATE INDEX IF NOT EXISTS idx_users_deleted_at ON users(deleted_at)",
    ),
    (
        "index orders.user_id",
        "CREATE INDEX IF NOT EXISTS idx_orders_user_id ON orders(user_id)",
    ),
    (
        "index orders.product_id",
        "CREATE INDEX IF NOT EXISTS idx_orders_product_id ON orders(product_id)",
    ),
    // Added after the first release; older databases lack the column
    (
        "add users.phone_number",
        "ALTER TABLE users ADD COLUMN IF NOT EXISTS phone_number VARCHAR(15)",
    ),
];

/// Advisory lock key held while migrating, so concurrent starts queue up
/// instead of racing on `CREATE TABLE`.
const MIGRATION_LOCK: i64 = 0x746f_6b6f;

/// Run all migrations in order inside one transaction.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");

    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(MIGRATION_LOCK)
        .execute(&mut *tx)
        .await?;
    for (name, sql) in STATEMENTS {
        tracing::debug!(step = name, "applying");
        sqlx::query(sql).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!(steps = STATEMENTS.len(), "Migrations complete");
    Ok(())
}
