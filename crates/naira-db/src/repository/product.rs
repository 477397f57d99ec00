//! # Product Repository
//!
//! Database operations for the store catalog.
//!
//! ## Key Operations
//! - `search`: FTS5 full-text search for the till
//! - `lookup`: exact barcode / SKU match for scanners
//! - `create` / `update`: uniqueness-checked writes
//! - `soft_delete` / `hard_delete`: retire or remove a product
//!
//! ## Uniqueness
//! SKU and barcode are unique among **active** products only (partial
//! indexes in `001_initial_schema.sql`). Writes check first so the caller
//! gets a `Duplicate` validation error naming the field; the index catches
//! the race.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{commit, DbError, DbResult};
use crate::repository::{generate_id, insert_movement, MovementRecord};
use naira_core::validation::{
    non_blank, validate_barcode, validate_bounded, validate_new_product, validate_price_kobo,
    validate_product_name, validate_sku, validate_text,
};
use naira_core::{
    CoreError, MovementType, NewProduct, Product, ProductUpdate, ValidationError,
    DEFAULT_CATEGORY, DEFAULT_REORDER_LEVEL, MAX_PRICE_KOBO, MAX_STOCK_QUANTITY,
};

const PRODUCT_COLUMNS: &str = "id, sku, barcode, name, description, category, price_kobo, \
     cost_price_kobo, stock_quantity, reorder_level, is_active, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// // Scanner input
/// let product = repo.lookup("6154000004451").await?;
///
/// // Till search box
/// let results = repo.search("semo", false, 20).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches products using full-text search.
    ///
    /// ## How It Works
    /// 1. The query is quoted as a single FTS5 phrase with a prefix star,
    ///    so punctuation in SKUs cannot break the MATCH syntax
    /// 2. Searches across: SKU, name, barcode, category
    /// 3. Returns products ordered by relevance
    ///
    /// An empty query lists products by name.
    ///
    /// ## Arguments
    /// * `query` - Search term (can be partial)
    /// * `include_inactive` - Also return soft-deleted products
    /// * `limit` - Maximum results to return
    pub async fn search(
        &self,
        query: &str,
        include_inactive: bool,
        limit: i64,
    ) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list(include_inactive, limit).await;
        }

        // Nothing FTS5 would tokenize
        if !query.chars().any(char::is_alphanumeric) {
            return Ok(Vec::new());
        }

        // "peak milk" becomes "\"peak milk\"*"
        let fts_query = format!("\"{}\"*", query.replace('"', "\"\""));

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT p.*
            FROM products_fts
            INNER JOIN products p ON p.id = products_fts.product_id
            WHERE products_fts MATCH ?1
              AND (?2 OR p.is_active = 1)
            ORDER BY products_fts.rank
            LIMIT ?3
            "#,
        )
        .bind(fts_query)
        .bind(include_inactive)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    async fn list(&self, include_inactive: bool, limit: i64) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE (?1 OR is_active = 1) ORDER BY name LIMIT ?2"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(include_inactive)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by its ID, active or not.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Like [`get_by_id`](Self::get_by_id) but a missing row is an error.
    pub async fn get(&self, id: &str) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Gets the active product with this SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1 AND is_active = 1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(sku.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Finds an active product by exact barcode or SKU.
    ///
    /// Barcode wins when one product's barcode equals another's SKU.
    pub async fn lookup(&self, code: &str) -> DbResult<Product> {
        let code = code.trim();
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_active = 1 AND (barcode = ?1 OR sku = ?1)
            ORDER BY (barcode = ?1) DESC
            LIMIT 1
            "#
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::Rejected(CoreError::ProductNotFound(code.to_string())))
    }

    /// Distinct categories of active products, alphabetically.
    pub async fn categories(&self) -> DbResult<Vec<String>> {
        let categories: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT category FROM products WHERE is_active = 1 ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Creates a product.
    ///
    /// Opening stock above zero is written as an `adjustment` movement with
    /// the note `opening stock`, in the same transaction as the product.
    ///
    /// ## Arguments
    /// * `input` - Validated here; blanks in optional fields become NULL
    /// * `actor` - User id recorded on the opening movement
    pub async fn create(&self, input: &NewProduct, actor: Option<&str>) -> DbResult<Product> {
        validate_new_product(input)?;

        let sku = input.sku.trim();
        let barcode = non_blank(&input.barcode);
        self.ensure_unique(sku, barcode, None).await?;

        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            sku: sku.to_string(),
            barcode: barcode.map(str::to_string),
            name: input.name.trim().to_string(),
            description: non_blank(&input.description).map(str::to_string),
            category: non_blank(&input.category)
                .unwrap_or(DEFAULT_CATEGORY)
                .to_string(),
            price_kobo: input.price_kobo,
            cost_price_kobo: input.cost_price_kobo,
            stock_quantity: input.stock_quantity,
            reorder_level: input.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, barcode, name, description, category, price_kobo,
                cost_price_kobo, stock_quantity, reorder_level, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price_kobo)
        .bind(product.cost_price_kobo)
        .bind(product.stock_quantity)
        .bind(product.reorder_level)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| duplicate_field(e.into(), &product))?;

        if product.stock_quantity > 0 {
            insert_movement(
                &mut tx,
                &MovementRecord {
                    product_id: &product.id,
                    quantity: product.stock_quantity,
                    movement_type: MovementType::Adjustment,
                    stock_before: 0,
                    stock_after: product.stock_quantity,
                    reference: None,
                    notes: Some("opening stock"),
                    created_by: actor,
                    created_at: now,
                },
            )
            .await?;
        }

        commit(tx).await?;

        info!(
            product_id = %product.id,
            sku = %product.sku,
            stock = product.stock_quantity,
            "Product created"
        );
        Ok(product)
    }

    /// Applies a partial update. Stock is left untouched.
    ///
    /// Blank `barcode` or `description` clears the field; blank `category`
    /// resets it to the default.
    pub async fn update(&self, id: &str, update: ProductUpdate) -> DbResult<Product> {
        let current = self.get(id).await?;

        let sku = match update.sku.as_deref() {
            Some(sku) => {
                validate_sku(sku)?;
                sku.trim().to_string()
            }
            None => current.sku.clone(),
        };
        let barcode = match update.barcode.as_deref().map(str::trim) {
            Some("") => None,
            Some(code) => {
                validate_barcode(code)?;
                Some(code.to_string())
            }
            None => current.barcode.clone(),
        };
        let name = match update.name.as_deref() {
            Some(name) => {
                validate_product_name(name)?;
                name.trim().to_string()
            }
            None => current.name.clone(),
        };
        let description = match update.description.as_deref().map(str::trim) {
            Some("") => None,
            Some(text) => {
                validate_text("description", text, 1000)?;
                Some(text.to_string())
            }
            None => current.description.clone(),
        };
        let category = match update.category.as_deref().map(str::trim) {
            Some("") => DEFAULT_CATEGORY.to_string(),
            Some(category) => {
                validate_text("category", category, 100)?;
                category.to_string()
            }
            None => current.category.clone(),
        };
        let price_kobo = update.price_kobo.unwrap_or(current.price_kobo);
        validate_price_kobo(price_kobo)?;
        let cost_price_kobo = if update.clear_cost_price {
            None
        } else {
            update.cost_price_kobo.or(current.cost_price_kobo)
        };
        if let Some(cost) = cost_price_kobo {
            validate_bounded("cost_price", cost, MAX_PRICE_KOBO)?;
        }
        let reorder_level = update.reorder_level.unwrap_or(current.reorder_level);
        validate_bounded("reorder_level", reorder_level, MAX_STOCK_QUANTITY)?;
        let is_active = update.is_active.unwrap_or(current.is_active);

        if is_active {
            self.ensure_unique(&sku, barcode.as_deref(), Some(id)).await?;
        }

        let updated = Product {
            sku,
            barcode,
            name,
            description,
            category,
            price_kobo,
            cost_price_kobo,
            reorder_level,
            is_active,
            updated_at: Utc::now(),
            ..current
        };

        sqlx::query(
            r#"
            UPDATE products SET
                sku = ?2, barcode = ?3, name = ?4, description = ?5, category = ?6,
                price_kobo = ?7, cost_price_kobo = ?8, reorder_level = ?9,
                is_active = ?10, updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(&updated.id)
        .bind(&updated.sku)
        .bind(&updated.barcode)
        .bind(&updated.name)
        .bind(&updated.description)
        .bind(&updated.category)
        .bind(updated.price_kobo)
        .bind(updated.cost_price_kobo)
        .bind(updated.reorder_level)
        .bind(updated.is_active)
        .bind(updated.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_field(e.into(), &updated))?;

        // Stock may have moved since `get`; return what is stored now.
        let stored = self.get(id).await?;
        info!(product_id = %id, sku = %stored.sku, "Product updated");
        Ok(stored)
    }

    /// Soft-deletes a product (sets is_active = false).
    ///
    /// The row stays for sale history; its SKU and barcode become free.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(product_id = %id, "Product deactivated");
        Ok(())
    }

    /// Deletes a product and its stock movements.
    ///
    /// Refused with `HasSalesHistory` when any sale item references it.
    pub async fn hard_delete(&self, id: &str) -> DbResult<()> {
        let product = self.get(id).await?;

        let sold: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items WHERE product_id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if sold > 0 {
            return Err(CoreError::HasSalesHistory { sku: product.sku }.into());
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM stock_movements WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        commit(tx).await?;

        info!(product_id = %id, sku = %product.sku, "Product deleted");
        Ok(())
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn ensure_unique(
        &self,
        sku: &str,
        barcode: Option<&str>,
        exclude_id: Option<&str>,
    ) -> DbResult<()> {
        let exclude = exclude_id.unwrap_or("");

        let sku_taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM products WHERE is_active = 1 AND sku = ?1 AND id <> ?2)",
        )
        .bind(sku)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        if sku_taken {
            return Err(ValidationError::duplicate("sku", sku).into());
        }

        if let Some(barcode) = barcode {
            let barcode_taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM products WHERE is_active = 1 AND barcode = ?1 AND id <> ?2)",
            )
            .bind(barcode)
            .bind(exclude)
            .fetch_one(&self.pool)
            .await?;
            if barcode_taken {
                return Err(ValidationError::duplicate("barcode", barcode).into());
            }
        }

        Ok(())
    }
}

/// Maps a unique-index failure to the `Duplicate` validation error for the
/// offending field.
fn duplicate_field(err: DbError, product: &Product) -> DbError {
    match err {
        DbError::UniqueViolation { field, .. } if field.contains("barcode") => {
            ValidationError::duplicate("barcode", product.barcode.clone().unwrap_or_default())
                .into()
        }
        DbError::UniqueViolation { .. } => ValidationError::duplicate("sku", &product.sku).into(),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
