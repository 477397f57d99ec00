//! # Schema Migrations
//!
//! The SQL under `migrations/sqlite/` is compiled into the binary and applied
//! on every [`Database::new`](crate::Database::new). Applied versions are
//! tracked by sqlx in `_sqlx_migrations`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  001_initial_schema.sql                                                 │
//! │     users, products, customers, sales, sale_items,                      │
//! │     receipt_sequences (one row per business day, bumped by checkout),   │
//! │     stock_movements, store_settings                                     │
//! │  002_product_search.sql                                                 │
//! │     products_fts (FTS5 over sku, name, barcode, category)               │
//! │     + insert/update/delete triggers keeping it in step with products    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Applied files are checksummed; edit the schema by adding
//! `NNN_description.sql`, never by changing a shipped file.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies pending migrations in filename order, each in its own transaction.
pub async fn run(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(migrations = MIGRATOR.migrations.len(), "Schema up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts.
pub async fn status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await?;
    Ok((MIGRATOR.migrations.len(), applied as usize))
}
