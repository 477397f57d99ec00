//! # Report Repository
//!
//! Read-only inventory reporting. Classification and totals come from
//! `naira_core::inventory`; this module only gathers the rows.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;
use naira_core::inventory::{InventoryReport, InventoryRow};

#[derive(Debug, sqlx::FromRow)]
struct InventoryRecord {
    id: String,
    sku: String,
    name: String,
    category: String,
    stock_quantity: i64,
    reorder_level: i64,
    price_kobo: i64,
    last_movement_at: Option<DateTime<Utc>>,
}

impl From<InventoryRecord> for InventoryRow {
    fn from(r: InventoryRecord) -> Self {
        InventoryRow::new(
            r.id,
            r.sku,
            r.name,
            r.category,
            r.stock_quantity,
            r.reorder_level,
            r.price_kobo,
            r.last_movement_at,
        )
    }
}

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Every active product with its status, value and latest movement,
    /// ordered by category then name.
    pub async fn inventory(&self) -> DbResult<InventoryReport> {
        let records = sqlx::query_as::<_, InventoryRecord>(
            r#"
            SELECT p.id, p.sku, p.name, p.category, p.stock_quantity, p.reorder_level,
                   p.price_kobo,
                   (SELECT MAX(m.created_at) FROM stock_movements m
                     WHERE m.product_id = p.id) AS last_movement_at
            FROM products p
            WHERE p.is_active = 1
            ORDER BY p.category, p.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(InventoryReport::from_rows(
            records.into_iter().map(InventoryRow::from).collect(),
        ))
    }

    /// OUT and LOW rows, lowest stock first.
    pub async fn low_stock(&self) -> DbResult<Vec<InventoryRow>> {
        let mut rows: Vec<InventoryRow> = self
            .inventory()
            .await?
            .rows
            .into_iter()
            .filter(|row| row.status.needs_reorder())
            .collect();
        rows.sort_by_key(|row| row.stock_quantity);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_product, test_db};
    use naira_core::StockStatus;

    #[tokio::test]
    async fn test_inventory_report_classifies_rows() {
        let db = test_db().await;
        seed_product(&db, "LOW-1", 1_000, 5).await;
        seed_product(&db, "OUT-1", 500, 0).await;
        seed_product(&db, "OK-1", 200, 50).await;
        let retired = seed_product(&db, "GONE-1", 200, 50).await;
        db.products().soft_delete(&retired.id).await.unwrap();

        let report = db.reports().inventory().await.unwrap();
        assert_eq!(report.total_products, 3);
        assert_eq!(report.low_stock, 1);
        assert_eq!(report.out_of_stock, 1);
        assert_eq!(report.in_stock, 1);
        assert_eq!(report.total_value_kobo, 5 * 1_000 + 50 * 200);

        let out = report.rows.iter().find(|r| r.sku == "OUT-1").unwrap();
        assert_eq!(out.status, StockStatus::Out);
        assert!(out.last_movement_at.is_none());
        let ok = report.rows.iter().find(|r| r.sku == "OK-1").unwrap();
        assert!(ok.last_movement_at.is_some());
    }

    #[tokio::test]
    async fn test_low_stock_lists_out_first() {
        let db = test_db().await;
        seed_product(&db, "LOW-1", 1_000, 5).await;
        seed_product(&db, "OUT-1", 500, 0).await;
        seed_product(&db, "OK-1", 200, 50).await;

        let low = db.reports().low_stock().await.unwrap();
        let skus: Vec<&str> = low.iter().map(|r| r.sku.as_str()).collect();
        assert_eq!(skus, vec!["OUT-1", "LOW-1"]);
    }
}
