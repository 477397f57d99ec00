//! # Sale Repository
//!
//! Checkout, void, and reads over the sales ledger.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutPlan (priced + tendered by naira-core)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │  ├── receipt_sequences[day] += 1        → REC-YYYYMMDD-NNNN            │
//! │  ├── customer exists?                   → CustomerNotFound             │
//! │  ├── INSERT sales                                                      │
//! │  └── for each line:                                                    │
//! │        UPDATE products SET stock -= q                                  │
//! │          WHERE id = ? AND is_active = 1 AND stock >= q                 │
//! │          RETURNING stock                no row → roll back, reject     │
//! │        INSERT sale_items (sku / name / price snapshot)                 │
//! │        INSERT stock_movements (sale, −q, before, after)                │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first statement of every write transaction here is a write, so the
//! connection takes SQLite's write lock up front and waits on `busy_timeout`
//! instead of failing a read-to-write upgrade.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{commit, DbError, DbResult};
use crate::repository::{clamp_limit, generate_id, insert_movement, MovementRecord};
use naira_core::cart::CartLine;
use naira_core::checkout::{day_key, format_receipt_number, CheckoutPlan};
use naira_core::validation::validate_text;
use naira_core::{
    CoreError, MovementType, Sale, SaleDetail, SaleItem, SaleStatus, SalesSummary, TopProduct,
};

const SALE_COLUMNS: &str = "id, receipt_number, status, subtotal_kobo, tax_kobo, tax_rate_bps, \
     discount_kobo, total_kobo, amount_paid_kobo, change_kobo, payment_method, customer_id, \
     user_id, created_at, voided_at, void_reason, voided_by";

/// Filters for the sales list. Dates are UTC instants.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleQuery {
    #[serde(default)]
    pub status: Option<SaleStatus>,
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Commits a planned sale.
    ///
    /// Everything happens in one transaction. Any error drops the
    /// transaction, so no sale row, item, movement or stock change survives
    /// a failed checkout.
    ///
    /// ## Errors
    /// * `Rejected(InsufficientStock)` - stock fell below the cart quantity
    /// * `Rejected(ProductInactive)` - product retired since it was carted
    /// * `Rejected(CustomerNotFound)` - unknown `customer_id`
    pub async fn checkout(&self, plan: &CheckoutPlan) -> DbResult<SaleDetail> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let sequence: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO receipt_sequences (day, last_value) VALUES (?1, 1)
            ON CONFLICT (day) DO UPDATE SET last_value = last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(day_key(plan.business_day))
        .fetch_one(&mut *tx)
        .await?;
        let receipt_number = format_receipt_number(plan.business_day, sequence);

        if let Some(customer_id) = &plan.customer_id {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM customers WHERE id = ?1)")
                    .bind(customer_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !exists {
                return Err(CoreError::CustomerNotFound(customer_id.clone()).into());
            }
        }

        let totals = &plan.totals;
        let sale = Sale {
            id: generate_id(),
            receipt_number,
            status: SaleStatus::Completed,
            subtotal_kobo: totals.subtotal.kobo(),
            tax_kobo: totals.tax.kobo(),
            tax_rate_bps: plan.tax_rate.bps(),
            discount_kobo: totals.discount.kobo(),
            total_kobo: totals.total.kobo(),
            amount_paid_kobo: plan.tender.amount_paid.kobo(),
            change_kobo: plan.tender.change.kobo(),
            payment_method: plan.payment_method,
            customer_id: plan.customer_id.clone(),
            user_id: plan.cashier_id.clone(),
            created_at: now,
            voided_at: None,
            void_reason: None,
            voided_by: None,
        };

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, receipt_number, status, subtotal_kobo, tax_kobo, tax_rate_bps,
                discount_kobo, total_kobo, amount_paid_kobo, change_kobo,
                payment_method, customer_id, user_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.receipt_number)
        .bind(sale.status)
        .bind(sale.subtotal_kobo)
        .bind(sale.tax_kobo)
        .bind(sale.tax_rate_bps)
        .bind(sale.discount_kobo)
        .bind(sale.total_kobo)
        .bind(sale.amount_paid_kobo)
        .bind(sale.change_kobo)
        .bind(sale.payment_method)
        .bind(&sale.customer_id)
        .bind(&sale.user_id)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(plan.lines.len());
        for line in &plan.lines {
            let stock_after: Option<i64> = sqlx::query_scalar(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity - ?2, updated_at = ?3
                WHERE id = ?1 AND is_active = 1 AND stock_quantity >= ?2
                RETURNING stock_quantity
                "#,
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(stock_after) = stock_after else {
                let err = checkout_rejection(&mut tx, line).await;
                warn!(
                    sku = %line.sku,
                    quantity = line.quantity,
                    error = %err,
                    "Checkout rolled back"
                );
                return Err(err);
            };

            let item = SaleItem {
                id: generate_id(),
                sale_id: sale.id.clone(),
                product_id: line.product_id.clone(),
                sku_snapshot: line.sku.clone(),
                name_snapshot: line.name.clone(),
                quantity: line.quantity,
                unit_price_kobo: line.unit_price_kobo,
                subtotal_kobo: line.subtotal()?.kobo(),
            };
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, sku_snapshot, name_snapshot,
                    quantity, unit_price_kobo, subtotal_kobo
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(&item.sku_snapshot)
            .bind(&item.name_snapshot)
            .bind(item.quantity)
            .bind(item.unit_price_kobo)
            .bind(item.subtotal_kobo)
            .execute(&mut *tx)
            .await?;

            insert_movement(
                &mut tx,
                &MovementRecord {
                    product_id: &line.product_id,
                    quantity: -line.quantity,
                    movement_type: MovementType::Sale,
                    stock_before: stock_after + line.quantity,
                    stock_after,
                    reference: Some(&sale.receipt_number),
                    notes: None,
                    created_by: Some(&plan.cashier_id),
                    created_at: now,
                },
            )
            .await?;

            items.push(item);
        }

        commit(tx).await?;

        info!(
            receipt = %sale.receipt_number,
            total = %sale.total(),
            lines = items.len(),
            cashier_id = %sale.user_id,
            "Sale completed"
        );
        Ok(SaleDetail { sale, items })
    }

    /// Voids a completed sale and puts its stock back.
    ///
    /// Voiding an already-voided sale changes nothing and returns the stored
    /// record. The status flip is conditional, so two concurrent voids
    /// restore stock once.
    ///
    /// ## Arguments
    /// * `sale_id` - the sale to void
    /// * `reason` - required, stored on the sale
    /// * `actor` - user id stored as `voided_by` and on the return movements
    pub async fn void(&self, sale_id: &str, reason: &str, actor: &str) -> DbResult<SaleDetail> {
        validate_text("reason", reason, 500)?;
        let reason = reason.trim();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let flipped = sqlx::query(
            r#"
            UPDATE sales
            SET status = ?2, voided_at = ?3, void_reason = ?4, voided_by = ?5
            WHERE id = ?1 AND status = ?6
            "#,
        )
        .bind(sale_id)
        .bind(SaleStatus::Voided)
        .bind(now)
        .bind(reason)
        .bind(actor)
        .bind(SaleStatus::Completed)
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            let existing = self
                .get(sale_id)
                .await?
                .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;
            debug!(receipt = %existing.sale.receipt_number, "Sale already voided");
            return Ok(existing);
        }

        let receipt_number: String =
            sqlx::query_scalar("SELECT receipt_number FROM sales WHERE id = ?1")
                .bind(sale_id)
                .fetch_one(&mut *tx)
                .await?;
        let items = fetch_items(&mut tx, sale_id).await?;

        for item in &items {
            let stock_after: i64 = sqlx::query_scalar(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity + ?2, updated_at = ?3
                WHERE id = ?1
                RETURNING stock_quantity
                "#,
            )
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

            insert_movement(
                &mut tx,
                &MovementRecord {
                    product_id: &item.product_id,
                    quantity: item.quantity,
                    movement_type: MovementType::Return,
                    stock_before: stock_after - item.quantity,
                    stock_after,
                    reference: Some(&receipt_number),
                    notes: Some(reason),
                    created_by: Some(actor),
                    created_at: now,
                },
            )
            .await?;
        }

        commit(tx).await?;

        info!(receipt = %receipt_number, voided_by = %actor, "Sale voided");
        self.get(sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Sale with its items.
    pub async fn get(&self, id: &str) -> DbResult<Option<SaleDetail>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        self.with_items(sale).await
    }

    pub async fn get_by_receipt(&self, receipt_number: &str) -> DbResult<Option<SaleDetail>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE receipt_number = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(receipt_number.trim())
            .fetch_optional(&self.pool)
            .await?;
        self.with_items(sale).await
    }

    /// Newest first, without items.
    pub async fn list(&self, query: &SaleQuery) -> DbResult<Vec<Sale>> {
        let sql = format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL OR created_at >= ?2)
              AND (?3 IS NULL OR created_at < ?3)
            ORDER BY created_at DESC
            LIMIT ?4 OFFSET ?5
            "#
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(query.status)
            .bind(query.from)
            .bind(query.to)
            .bind(clamp_limit(query.limit))
            .bind(query.offset.unwrap_or(0).max(0))
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Every sale in `[from, to)`, oldest first.
    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Sale>> {
        let sql = format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at
            "#
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Completed-sale totals, all time and within `[today_start, today_end)`.
    pub async fn summary(
        &self,
        today_start: DateTime<Utc>,
        today_end: DateTime<Utc>,
    ) -> DbResult<SalesSummary> {
        let (total_sales_kobo, total_transactions, today_sales_kobo, today_transactions, voided): (
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN status = 'completed' THEN total_kobo END), 0),
                COUNT(CASE WHEN status = 'completed' THEN 1 END),
                COALESCE(SUM(CASE WHEN status = 'completed'
                                   AND created_at >= ?1 AND created_at < ?2
                                  THEN total_kobo END), 0),
                COUNT(CASE WHEN status = 'completed'
                            AND created_at >= ?1 AND created_at < ?2 THEN 1 END),
                COUNT(CASE WHEN status = 'voided' THEN 1 END)
            FROM sales
            "#,
        )
        .bind(today_start)
        .bind(today_end)
        .fetch_one(&self.pool)
        .await?;

        let average_sale_kobo = if total_transactions > 0 {
            total_sales_kobo / total_transactions
        } else {
            0
        };

        Ok(SalesSummary {
            total_sales_kobo,
            total_transactions,
            today_sales_kobo,
            today_transactions,
            average_sale_kobo,
            voided_transactions: voided,
        })
    }

    /// Best sellers by units in completed sales since `since`.
    pub async fn top_products(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<TopProduct>> {
        let top = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT p.id AS product_id,
                   p.sku AS sku,
                   p.name AS name,
                   SUM(si.quantity) AS quantity_sold,
                   SUM(si.subtotal_kobo) AS revenue_kobo
            FROM sale_items si
            INNER JOIN sales s ON s.id = si.sale_id
            INNER JOIN products p ON p.id = si.product_id
            WHERE s.status = 'completed' AND s.created_at >= ?1
            GROUP BY p.id, p.sku, p.name
            ORDER BY quantity_sold DESC, revenue_kobo DESC
            LIMIT ?2
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(top)
    }

    async fn with_items(&self, sale: Option<Sale>) -> DbResult<Option<SaleDetail>> {
        let Some(sale) = sale else {
            return Ok(None);
        };
        let mut conn = self.pool.acquire().await?;
        let items = fetch_items(&mut conn, &sale.id).await?;
        Ok(Some(SaleDetail { sale, items }))
    }
}

async fn fetch_items(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Vec<SaleItem>> {
    let items = sqlx::query_as::<_, SaleItem>(
        r#"
        SELECT id, sale_id, product_id, sku_snapshot, name_snapshot,
               quantity, unit_price_kobo, subtotal_kobo
        FROM sale_items
        WHERE sale_id = ?1
        ORDER BY rowid
        "#,
    )
    .bind(sale_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

/// Explains why a line's conditional decrement matched no row.
async fn checkout_rejection(conn: &mut SqliteConnection, line: &CartLine) -> DbError {
    let row: Result<Option<(String, i64, bool)>, sqlx::Error> =
        sqlx::query_as("SELECT sku, stock_quantity, is_active FROM products WHERE id = ?1")
            .bind(&line.product_id)
            .fetch_optional(&mut *conn)
            .await;

    match row {
        Ok(Some((sku, _, false))) => CoreError::ProductInactive { sku }.into(),
        Ok(Some((sku, available, true))) => CoreError::InsufficientStock {
            sku,
            available,
            requested: line.quantity,
        }
        .into(),
        Ok(None) => CoreError::ProductNotFound(line.sku.clone()).into(),
        Err(e) => e.into(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_product, seed_user, test_db};
    use crate::Database;
    use chrono::NaiveDate;
    use naira_core::checkout::{day_bounds, plan_checkout, CheckoutRequest};
    use naira_core::{Cart, NewCustomer, PaymentMethod, Product, Role, StockAdjustment, StoreSettings, User};

    struct Fixture {
        db: Database,
        cashier: User,
        admin: User,
        rice: Product,
        milk: Product,
    }

    async fn fixture() -> Fixture {
        let db = test_db().await;
        let cashier = seed_user(&db, "cashier", Role::Cashier).await;
        let admin = seed_user(&db, "admin", Role::Admin).await;
        let rice = seed_product(&db, "A", 100_000, 10).await;
        let milk = seed_product(&db, "B", 50_000, 5).await;
        Fixture {
            db,
            cashier,
            admin,
            rice,
            milk,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn plan(f: &Fixture, paid: i64) -> CheckoutPlan {
        let mut cart = Cart::new();
        cart.add(&f.rice, 2).unwrap();
        cart.add(&f.milk, 1).unwrap();
        let request = CheckoutRequest {
            payment_method: PaymentMethod::Cash,
            amount_paid_kobo: paid,
            discount_kobo: 0,
            customer_id: None,
        };
        plan_checkout(&cart, &request, &StoreSettings::default(), &f.cashier.id, day()).unwrap()
    }

    async fn stock_of(db: &Database, id: &str) -> i64 {
        db.products().get(id).await.unwrap().stock_quantity
    }

    async fn sale_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_checkout_commits_sale_and_stock() {
        let f = fixture().await;
        let detail = f.db.sales().checkout(&plan(&f, 300_000)).await.unwrap();

        assert_eq!(detail.sale.receipt_number, "REC-20261015-0001");
        assert_eq!(detail.sale.subtotal_kobo, 250_000);
        assert_eq!(detail.sale.tax_kobo, 18_750);
        assert_eq!(detail.sale.total_kobo, 268_750);
        assert_eq!(detail.sale.change_kobo, 31_250);
        assert_eq!(detail.sale.tax_rate_bps, 750);
        assert_eq!(detail.items.len(), 2);

        assert_eq!(stock_of(&f.db, &f.rice.id).await, 8);
        assert_eq!(stock_of(&f.db, &f.milk.id).await, 4);

        let movements = f
            .db
            .stock()
            .movements(&crate::MovementQuery {
                product_id: Some(f.rice.id.clone()),
                limit: None,
            })
            .await
            .unwrap();
        let sale_movement = &movements[0];
        assert_eq!(sale_movement.movement_type, MovementType::Sale);
        assert_eq!(sale_movement.quantity, -2);
        assert_eq!(sale_movement.stock_before, 10);
        assert_eq!(sale_movement.stock_after, 8);
        assert_eq!(sale_movement.reference.as_deref(), Some("REC-20261015-0001"));

        let stored = f.db.sales().get(&detail.sale.id).await.unwrap().unwrap();
        assert_eq!(stored.items.len(), 2);
        assert_eq!(stored.items[0].name_snapshot, "Product A");
    }

    #[tokio::test]
    async fn test_receipt_numbers_increment_per_day() {
        let f = fixture().await;
        let first = f.db.sales().checkout(&plan(&f, 300_000)).await.unwrap();
        let second = f.db.sales().checkout(&plan(&f, 300_000)).await.unwrap();
        assert_eq!(first.sale.receipt_number, "REC-20261015-0001");
        assert_eq!(second.sale.receipt_number, "REC-20261015-0002");

        let mut next_day = plan(&f, 300_000);
        next_day.business_day = day().succ_opt().unwrap();
        let third = f.db.sales().checkout(&next_day).await.unwrap();
        assert_eq!(third.sale.receipt_number, "REC-20261016-0001");

        let found = f
            .db
            .sales()
            .get_by_receipt("REC-20261015-0002")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.sale.id, second.sale.id);
    }

    #[tokio::test]
    async fn test_stock_drop_after_carting_rolls_back() {
        let f = fixture().await;
        let planned = plan(&f, 300_000);

        // The last of the milk is written off after the cart was built
        f.db.stock()
            .adjust(
                &StockAdjustment {
                    product_id: f.milk.id.clone(),
                    quantity: -5,
                    movement_type: MovementType::Adjustment,
                    reference: None,
                    notes: Some("damaged".to_string()),
                },
                None,
            )
            .await
            .unwrap();

        let err = f.db.sales().checkout(&planned).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rejected(CoreError::InsufficientStock {
                available: 0,
                requested: 1,
                ..
            })
        ));

        assert_eq!(sale_count(&f.db).await, 0);
        assert_eq!(stock_of(&f.db, &f.rice.id).await, 10);
        assert_eq!(stock_of(&f.db, &f.milk.id).await, 0);

        // The receipt counter rolled back with everything else
        f.db.stock()
            .adjust(
                &StockAdjustment {
                    product_id: f.milk.id.clone(),
                    quantity: 5,
                    movement_type: MovementType::Purchase,
                    reference: None,
                    notes: None,
                },
                None,
            )
            .await
            .unwrap();
        let detail = f.db.sales().checkout(&planned).await.unwrap();
        assert_eq!(detail.sale.receipt_number, "REC-20261015-0001");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_checkouts_for_last_unit() {
        let path = std::env::temp_dir().join(format!("naira-race-{}.db", uuid::Uuid::new_v4()));
        let db = Database::new(crate::DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();
        let cashier = seed_user(&db, "cashier", Role::Cashier).await;
        let last = seed_product(&db, "GARRI-1KG", 80_000, 1).await;

        let mut cart = Cart::new();
        cart.add(&last, 1).unwrap();
        let request = CheckoutRequest {
            payment_method: PaymentMethod::Cash,
            amount_paid_kobo: 100_000,
            discount_kobo: 0,
            customer_id: None,
        };
        let plan =
            plan_checkout(&cart, &request, &StoreSettings::default(), &cashier.id, day()).unwrap();

        let (till_a, till_b) = (db.sales(), db.sales());
        let (first, second) = tokio::join!(till_a.checkout(&plan), till_b.checkout(&plan));

        let (won, lost): (Vec<_>, Vec<_>) = [first, second].into_iter().partition(Result::is_ok);
        assert_eq!(won.len(), 1);
        assert!(matches!(
            lost.into_iter().next(),
            Some(Err(DbError::Rejected(CoreError::InsufficientStock {
                available: 0,
                requested: 1,
                ..
            })))
        ));
        assert_eq!(stock_of(&db, &last.id).await, 0);
        assert_eq!(sale_count(&db).await, 1);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }

    #[tokio::test]
    async fn test_inactive_product_rejected_at_checkout() {
        let f = fixture().await;
        let planned = plan(&f, 300_000);
        f.db.products().soft_delete(&f.milk.id).await.unwrap();

        let err = f.db.sales().checkout(&planned).await.unwrap_err();
        assert!(matches!(err, DbError::Rejected(CoreError::ProductInactive { .. })));
        assert_eq!(sale_count(&f.db).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_customer_rejected() {
        let f = fixture().await;
        let mut planned = plan(&f, 300_000);
        planned.customer_id = Some("nobody".to_string());
        assert!(matches!(
            f.db.sales().checkout(&planned).await,
            Err(DbError::Rejected(CoreError::CustomerNotFound(_)))
        ));

        let customer = f
            .db
            .customers()
            .create(&NewCustomer {
                name: "Ifeoma".to_string(),
                phone: None,
                email: None,
            })
            .await
            .unwrap();
        planned.customer_id = Some(customer.id.clone());
        let detail = f.db.sales().checkout(&planned).await.unwrap();
        assert_eq!(detail.sale.customer_id, Some(customer.id));
    }

    #[tokio::test]
    async fn test_void_restores_stock_once() {
        let f = fixture().await;
        let detail = f.db.sales().checkout(&plan(&f, 300_000)).await.unwrap();

        let voided = f
            .db
            .sales()
            .void(&detail.sale.id, "Customer changed mind", &f.admin.id)
            .await
            .unwrap();
        assert_eq!(voided.sale.status, SaleStatus::Voided);
        assert_eq!(voided.sale.voided_by.as_deref(), Some(f.admin.id.as_str()));
        assert_eq!(stock_of(&f.db, &f.rice.id).await, 10);
        assert_eq!(stock_of(&f.db, &f.milk.id).await, 5);

        let again = f
            .db
            .sales()
            .void(&detail.sale.id, "Second attempt", &f.admin.id)
            .await
            .unwrap();
        assert_eq!(again.sale.voided_at, voided.sale.voided_at);
        assert_eq!(again.sale.void_reason.as_deref(), Some("Customer changed mind"));
        assert_eq!(stock_of(&f.db, &f.rice.id).await, 10);

        let returns: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stock_movements WHERE movement_type = 'return'",
        )
        .fetch_one(f.db.pool())
        .await
        .unwrap();
        assert_eq!(returns, 2);
    }

    #[tokio::test]
    async fn test_void_unknown_sale() {
        let f = fixture().await;
        assert!(matches!(
            f.db.sales().void("missing", "typo", &f.admin.id).await,
            Err(DbError::Rejected(CoreError::SaleNotFound(_)))
        ));
        assert!(f.db.sales().void("missing", "  ", &f.admin.id).await.is_err());
    }

    #[tokio::test]
    async fn test_summary_and_top_products() {
        let f = fixture().await;
        let first = f.db.sales().checkout(&plan(&f, 300_000)).await.unwrap();
        f.db.sales().checkout(&plan(&f, 300_000)).await.unwrap();
        f.db.sales()
            .void(&first.sale.id, "test", &f.admin.id)
            .await
            .unwrap();

        let (start, end) = day_bounds(
            Utc::now().date_naive(),
            chrono::FixedOffset::east_opt(0).unwrap(),
        )
        .unwrap();
        let summary = f.db.sales().summary(start, end).await.unwrap();
        assert_eq!(summary.total_transactions, 1);
        assert_eq!(summary.total_sales_kobo, 268_750);
        assert_eq!(summary.today_transactions, 1);
        assert_eq!(summary.average_sale_kobo, 268_750);
        assert_eq!(summary.voided_transactions, 1);

        let top = f
            .db
            .sales()
            .top_products(start - chrono::Duration::days(30), 5)
            .await
            .unwrap();
        assert_eq!(top[0].sku, "A");
        assert_eq!(top[0].quantity_sold, 2);
        assert_eq!(top[0].revenue_kobo, 200_000);

        let completed = f
            .db
            .sales()
            .list(&SaleQuery {
                status: Some(SaleStatus::Completed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(f.db.sales().list_between(start, end).await.unwrap().len(), 2);
    }
}
