//! # Stock Repository
//!
//! Manual stock movements and the movement history.
//!
//! ## Adjustment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate_adjustment(type, delta)      sign rules, non-zero             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  UPDATE products                                                        │
//! │     SET stock_quantity = stock_quantity + delta                         │
//! │   WHERE id = ? AND stock_quantity + delta >= 0                          │
//! │     AND stock_quantity + delta <= MAX_STOCK_QUANTITY                    │
//! │   RETURNING stock_quantity             no row → InsufficientStock       │
//! │                                          (delta > 0 → OutOfRange)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT stock_movements (before = after − delta, after)                 │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::error::{commit, DbError, DbResult};
use crate::repository::{clamp_limit, insert_movement, MovementRecord};
use naira_core::inventory::validate_adjustment;
use naira_core::validation::non_blank;
use naira_core::{CoreError, StockAdjustment, StockMovement, ValidationError, MAX_STOCK_QUANTITY};

/// Filters for the movement history.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementQuery {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Applies a manual stock movement.
    ///
    /// A delta that would take stock below zero is refused with
    /// `InsufficientStock`, one that would take it past
    /// [`MAX_STOCK_QUANTITY`] with `OutOfRange`. Nothing is written either way.
    ///
    /// ## Arguments
    /// * `adjustment` - product, signed delta, type, reference, notes
    /// * `actor` - user id recorded as `created_by`
    pub async fn adjust(
        &self,
        adjustment: &StockAdjustment,
        actor: Option<&str>,
    ) -> DbResult<StockMovement> {
        validate_adjustment(adjustment.movement_type, adjustment.quantity)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let stock_after: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + ?2, updated_at = ?3
            WHERE id = ?1 AND stock_quantity + ?2 >= 0 AND stock_quantity + ?2 <= ?4
            RETURNING stock_quantity
            "#,
        )
        .bind(&adjustment.product_id)
        .bind(adjustment.quantity)
        .bind(now)
        .bind(MAX_STOCK_QUANTITY)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(stock_after) = stock_after else {
            let err = if adjustment.quantity > 0 {
                overstock(&mut tx, &adjustment.product_id).await
            } else {
                shortfall(&mut tx, &adjustment.product_id, -adjustment.quantity).await
            };
            return Err(err);
        };

        let record = MovementRecord {
            product_id: &adjustment.product_id,
            quantity: adjustment.quantity,
            movement_type: adjustment.movement_type,
            stock_before: stock_after - adjustment.quantity,
            stock_after,
            reference: non_blank(&adjustment.reference),
            notes: non_blank(&adjustment.notes),
            created_by: actor,
            created_at: now,
        };
        let id = insert_movement(&mut tx, &record).await?;

        commit(tx).await?;

        info!(
            product_id = %adjustment.product_id,
            movement_type = adjustment.movement_type.as_str(),
            delta = adjustment.quantity,
            stock_after,
            "Stock adjusted"
        );

        Ok(StockMovement {
            id,
            product_id: adjustment.product_id.clone(),
            quantity: adjustment.quantity,
            movement_type: adjustment.movement_type,
            stock_before: record.stock_before,
            stock_after,
            reference: record.reference.map(str::to_string),
            notes: record.notes.map(str::to_string),
            created_by: actor.map(str::to_string),
            created_at: now,
        })
    }

    /// Newest first.
    pub async fn movements(&self, query: &MovementQuery) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, quantity, movement_type, stock_before, stock_after,
                   reference, notes, created_by, created_at
            FROM stock_movements
            WHERE (?1 IS NULL OR product_id = ?1)
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )
        .bind(&query.product_id)
        .bind(clamp_limit(query.limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}

/// Explains why a conditional stock update matched no row.
///
/// ## Returns
/// * `NotFound` - no such product
/// * `Rejected(InsufficientStock)` - the product exists but has too little
pub(crate) async fn shortfall(
    conn: &mut SqliteConnection,
    product_id: &str,
    requested: i64,
) -> DbError {
    let row: Result<Option<(String, i64)>, sqlx::Error> =
        sqlx::query_as("SELECT sku, stock_quantity FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await;

    match row {
        Ok(Some((sku, available))) => CoreError::InsufficientStock {
            sku,
            available,
            requested,
        }
        .into(),
        Ok(None) => DbError::not_found("Product", product_id),
        Err(e) => e.into(),
    }
}

/// Error for an increase refused by the stock ceiling.
async fn overstock(conn: &mut SqliteConnection, product_id: &str) -> DbError {
    let exists: Result<Option<i64>, sqlx::Error> =
        sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await;

    match exists {
        Ok(Some(_)) => ValidationError::OutOfRange {
            field: "stock_quantity".to_string(),
            min: 0,
            max: MAX_STOCK_QUANTITY,
        }
        .into(),
        Ok(None) => DbError::not_found("Product", product_id),
        Err(e) => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_product, seed_user, test_db};
    use naira_core::{MovementType, Role};

    fn adjustment(product_id: &str, quantity: i64, movement_type: MovementType) -> StockAdjustment {
        StockAdjustment {
            product_id: product_id.to_string(),
            quantity,
            movement_type,
            reference: Some("INV-0042".to_string()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_purchase_increases_stock() {
        let db = test_db().await;
        let user = seed_user(&db, "store", Role::Inventory).await;
        let product = seed_product(&db, "RICE-50KG", 7_500_000, 4).await;

        let movement = db
            .stock()
            .adjust(&adjustment(&product.id, 20, MovementType::Purchase), Some(&user.id))
            .await
            .unwrap();

        assert_eq!(movement.stock_before, 4);
        assert_eq!(movement.stock_after, 24);
        assert_eq!(movement.reference.as_deref(), Some("INV-0042"));
        assert_eq!(db.products().get(&product.id).await.unwrap().stock_quantity, 24);
    }

    #[tokio::test]
    async fn test_adjustment_below_zero_rejected() {
        let db = test_db().await;
        let product = seed_product(&db, "OIL-5L", 950_000, 3).await;

        let err = db
            .stock()
            .adjust(&adjustment(&product.id, -4, MovementType::Adjustment), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Rejected(CoreError::InsufficientStock {
                available: 3,
                requested: 4,
                ..
            })
        ));

        assert_eq!(db.products().get(&product.id).await.unwrap().stock_quantity, 3);
        let history = db
            .stock()
            .movements(&MovementQuery {
                product_id: Some(product.id.clone()),
                limit: None,
            })
            .await
            .unwrap();
        // Only the opening stock movement
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_adjustment_to_exactly_zero_allowed() {
        let db = test_db().await;
        let product = seed_product(&db, "EGGS-CRATE", 300_000, 2).await;
        let movement = db
            .stock()
            .adjust(&adjustment(&product.id, -2, MovementType::Adjustment), None)
            .await
            .unwrap();
        assert_eq!(movement.stock_after, 0);
    }

    #[tokio::test]
    async fn test_sign_rules_enforced() {
        let db = test_db().await;
        let product = seed_product(&db, "SALT-500G", 30_000, 10).await;
        assert!(db
            .stock()
            .adjust(&adjustment(&product.id, -1, MovementType::Purchase), None)
            .await
            .is_err());
        assert!(db
            .stock()
            .adjust(&adjustment(&product.id, 0, MovementType::Adjustment), None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_adjustment_past_ceiling_rejected() {
        let db = test_db().await;
        let product = seed_product(&db, "SUGAR-1KG", 120_000, 10).await;

        let err = db
            .stock()
            .adjust(
                &adjustment(&product.id, MAX_STOCK_QUANTITY - 9, MovementType::Purchase),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Rejected(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(db.products().get(&product.id).await.unwrap().stock_quantity, 10);

        let movement = db
            .stock()
            .adjust(
                &adjustment(&product.id, MAX_STOCK_QUANTITY - 10, MovementType::Purchase),
                None,
            )
            .await
            .unwrap();
        assert_eq!(movement.stock_after, MAX_STOCK_QUANTITY);

        assert!(db
            .stock()
            .adjust(&adjustment(&product.id, i64::MAX, MovementType::Purchase), None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let db = test_db().await;
        let err = db
            .stock()
            .adjust(&adjustment("missing", 5, MovementType::Purchase), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_movements_newest_first() {
        let db = test_db().await;
        let product = seed_product(&db, "MAGGI-CUBE", 5_000, 100).await;
        db.stock()
            .adjust(&adjustment(&product.id, -5, MovementType::Adjustment), None)
            .await
            .unwrap();

        let history = db.stock().movements(&MovementQuery::default()).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].quantity, -5);
        assert_eq!(history[1].notes.as_deref(), Some("opening stock"));
    }
}
