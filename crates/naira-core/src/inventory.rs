//! # Inventory Rules
//!
//! Stock status classification for the inventory report and the sign rules
//! for manual stock movements.
//!
//! ```text
//!   stock ≤ 0                 → OUT
//!   0 < stock ≤ reorder_level → LOW
//!   stock > reorder_level     → OK
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{ValidationError, CoreResult};
use crate::money::Money;
use crate::types::MovementType;
use crate::MAX_STOCK_QUANTITY;

// =============================================================================
// Stock Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum StockStatus {
    Out,
    Low,
    Ok,
}

impl StockStatus {
    pub fn classify(stock: i64, reorder_level: i64) -> Self {
        if stock <= 0 {
            StockStatus::Out
        } else if stock <= reorder_level {
            StockStatus::Low
        } else {
            StockStatus::Ok
        }
    }

    /// OUT and LOW both need restocking.
    #[inline]
    pub fn needs_reorder(&self) -> bool {
        !matches!(self, StockStatus::Ok)
    }
}

// =============================================================================
// Report Rows
// =============================================================================

/// One product in the inventory report.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryRow {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub stock_quantity: i64,
    pub reorder_level: i64,
    pub price_kobo: i64,
    /// stock × price
    pub stock_value_kobo: i64,
    pub status: StockStatus,
    #[ts(as = "Option<String>")]
    pub last_movement_at: Option<DateTime<Utc>>,
}

impl InventoryRow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        product_id: String,
        sku: String,
        name: String,
        category: String,
        stock_quantity: i64,
        reorder_level: i64,
        price_kobo: i64,
        last_movement_at: Option<DateTime<Utc>>,
    ) -> Self {
        let value = Money::from_kobo(price_kobo).saturating_multiply_quantity(stock_quantity.max(0));
        InventoryRow {
            product_id,
            sku,
            name,
            category,
            stock_quantity,
            reorder_level,
            price_kobo,
            stock_value_kobo: value.kobo(),
            status: StockStatus::classify(stock_quantity, reorder_level),
            last_movement_at,
        }
    }
}

/// Report rows with per-status counts and total value.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryReport {
    pub rows: Vec<InventoryRow>,
    pub total_products: usize,
    pub out_of_stock: usize,
    pub low_stock: usize,
    pub in_stock: usize,
    pub total_value_kobo: i64,
}

impl InventoryReport {
    pub fn from_rows(rows: Vec<InventoryRow>) -> Self {
        let count = |status: StockStatus| rows.iter().filter(|r| r.status == status).count();
        InventoryReport {
            total_products: rows.len(),
            out_of_stock: count(StockStatus::Out),
            low_stock: count(StockStatus::Low),
            in_stock: count(StockStatus::Ok),
            total_value_kobo: rows
                .iter()
                .fold(0i64, |acc, r| acc.saturating_add(r.stock_value_kobo)),
            rows,
        }
    }
}

// =============================================================================
// Adjustment Rules
// =============================================================================

/// Sign rules for a stock movement.
///
/// - purchase, return: delta > 0
/// - sale: delta < 0
/// - adjustment: any non-zero delta
///
/// `|delta|` is capped at [`MAX_STOCK_QUANTITY`]. Whether the result stays
/// within `0..=MAX_STOCK_QUANTITY` is checked atomically by the database layer.
pub fn validate_adjustment(movement_type: MovementType, delta: i64) -> CoreResult<()> {
    if delta == 0 || delta.unsigned_abs() > MAX_STOCK_QUANTITY.unsigned_abs() {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_STOCK_QUANTITY,
        }
        .into());
    }

    let sign_ok = match movement_type {
        MovementType::Purchase | MovementType::Return => delta > 0,
        MovementType::Sale => delta < 0,
        MovementType::Adjustment => true,
    };

    if !sign_ok {
        return Err(ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: format!(
                "{} movements must be {}",
                movement_type.as_str(),
                if delta > 0 { "negative" } else { "positive" }
            ),
        }
        .into());
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_examples() {
        assert_eq!(StockStatus::classify(5, 10), StockStatus::Low);
        assert_eq!(StockStatus::classify(0, 10), StockStatus::Out);
        assert_eq!(StockStatus::classify(50, 10), StockStatus::Ok);
    }

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(StockStatus::classify(10, 10), StockStatus::Low);
        assert_eq!(StockStatus::classify(11, 10), StockStatus::Ok);
        assert_eq!(StockStatus::classify(-2, 10), StockStatus::Out);
        assert_eq!(StockStatus::classify(1, 0), StockStatus::Ok);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&StockStatus::Low).unwrap(), "\"LOW\"");
    }

    #[test]
    fn test_report_totals() {
        let rows = vec![
            InventoryRow::new("1".into(), "A".into(), "A".into(), "X".into(), 5, 10, 1000, None),
            InventoryRow::new("2".into(), "B".into(), "B".into(), "X".into(), 0, 10, 500, None),
            InventoryRow::new("3".into(), "C".into(), "C".into(), "X".into(), 50, 10, 200, None),
        ];
        let report = InventoryReport::from_rows(rows);
        assert_eq!(report.total_products, 3);
        assert_eq!(report.low_stock, 1);
        assert_eq!(report.out_of_stock, 1);
        assert_eq!(report.in_stock, 1);
        assert_eq!(report.total_value_kobo, 5 * 1000 + 50 * 200);
    }

    #[test]
    fn test_adjustment_sign_rules() {
        assert!(validate_adjustment(MovementType::Purchase, 10).is_ok());
        assert!(validate_adjustment(MovementType::Purchase, -1).is_err());
        assert!(validate_adjustment(MovementType::Return, 2).is_ok());
        assert!(validate_adjustment(MovementType::Sale, -3).is_ok());
        assert!(validate_adjustment(MovementType::Sale, 3).is_err());
        assert!(validate_adjustment(MovementType::Adjustment, -4).is_ok());
        assert!(validate_adjustment(MovementType::Adjustment, 0).is_err());
    }

    #[test]
    fn test_adjustment_magnitude_is_capped() {
        assert!(validate_adjustment(MovementType::Purchase, MAX_STOCK_QUANTITY).is_ok());
        assert!(validate_adjustment(MovementType::Adjustment, -MAX_STOCK_QUANTITY).is_ok());
        assert!(validate_adjustment(MovementType::Purchase, MAX_STOCK_QUANTITY + 1).is_err());
        assert!(validate_adjustment(MovementType::Adjustment, i64::MIN).is_err());
        assert!(validate_adjustment(MovementType::Purchase, i64::MAX).is_err());
    }

    #[test]
    fn test_report_value_saturates() {
        let rows = vec![
            InventoryRow::new("1".into(), "A".into(), "A".into(), "X".into(), i64::MAX, 0, 2, None),
            InventoryRow::new("2".into(), "B".into(), "B".into(), "X".into(), 1, 0, 100, None),
        ];
        assert_eq!(rows[0].stock_value_kobo, i64::MAX);
        assert_eq!(InventoryReport::from_rows(rows).total_value_kobo, i64::MAX);
    }
}
