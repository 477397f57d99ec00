//! # Repository Module
//!
//! Database repository implementations for Naira POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                          │
//! │       │  db.products().lookup("6154000004451")                         │
//! │       ▼                                                                 │
//! │  ProductRepository / SaleRepository / StockRepository / ...            │
//! │       │  SQL (single statement, or one transaction per operation)      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Floor
//! `products.stock_quantity` never goes below zero. Every decrement is a
//! conditional `UPDATE ... WHERE stock_quantity >= ?` inside the same
//! transaction that writes the matching `stock_movements` row, so two tills
//! selling the last unit cannot both succeed.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD, lookup and search
//! - [`customer::CustomerRepository`] - Customer records
//! - [`sale::SaleRepository`] - Checkout, void and the sales ledger
//! - [`stock::StockRepository`] - Manual stock movements and history
//! - [`user::UserRepository`] - Staff accounts
//! - [`settings::SettingsRepository`] - Store settings row
//! - [`report::ReportRepository`] - Inventory report

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::DbResult;
use naira_core::MovementType;

pub mod customer;
pub mod product;
pub mod report;
pub mod sale;
pub mod settings;
pub mod stock;
pub mod user;

/// New UUID v4 primary key.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Default page size for list endpoints.
pub const DEFAULT_LIMIT: i64 = 50;
/// Upper bound for any caller-supplied limit.
pub const MAX_LIMIT: i64 = 500;

/// Clamps a caller-supplied limit into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Fields of one stock ledger row, written inside an open transaction.
pub(crate) struct MovementRecord<'a> {
    pub product_id: &'a str,
    pub quantity: i64,
    pub movement_type: MovementType,
    pub stock_before: i64,
    pub stock_after: i64,
    pub reference: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub created_by: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Appends to `stock_movements`. Returns the new row id.
pub(crate) async fn insert_movement(
    conn: &mut SqliteConnection,
    record: &MovementRecord<'_>,
) -> DbResult<String> {
    let id = generate_id();
    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, product_id, quantity, movement_type, stock_before, stock_after,
            reference, notes, created_by, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&id)
    .bind(record.product_id)
    .bind(record.quantity)
    .bind(record.movement_type)
    .bind(record.stock_before)
    .bind(record.stock_after)
    .bind(record.reference)
    .bind(record.notes)
    .bind(record.created_by)
    .bind(record.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LIMIT);
        assert_eq!(clamp_limit(Some(20)), 20);
    }
}
