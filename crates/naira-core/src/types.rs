//! # Domain Types
//!
//! Core domain types used throughout Naira POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │ StockMovement   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  product_id     │       │
//! │  │  sku / barcode  │   │  receipt_number │   │  quantity (±)   │       │
//! │  │  price_kobo     │   │  status         │   │  movement_type  │       │
//! │  │  stock_quantity │   │  total_kobo     │   │  before / after │       │
//! │  └─────────────────┘   └────────┬────────┘   └─────────────────┘       │
//! │                                 │ 1..N                                  │
//! │  ┌─────────────────┐   ┌────────▼────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │    SaleItem     │   │      User       │       │
//! │  │  (optional on   │   │  price snapshot │   │  username       │       │
//! │  │   a sale)       │   │  qty, subtotal  │   │  role, active   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4, immutable, used for database relations
//! - A business key where one exists: `sku`, `receipt_number`, `username`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::access::Role;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points. 1 bps = 0.01%, so 750 bps = 7.5% VAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a fraction such as `0.075`.
    pub fn from_fraction(fraction: f64) -> Self {
        TaxRate((fraction * 10000.0).round() as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the store catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit, unique among active products.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, ...), unique among active products when set.
    pub barcode: Option<String>,

    /// Display name shown at the till and on the receipt.
    pub name: String,

    pub description: Option<String>,

    pub category: String,

    /// Selling price in kobo.
    pub price_kobo: i64,

    /// Purchase cost in kobo.
    pub cost_price_kobo: Option<i64>,

    /// Units on hand. Never negative after a committed operation.
    pub stock_quantity: i64,

    /// At or below this level the product is reported LOW.
    pub reorder_level: i64,

    /// False once soft-deleted.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_kobo(self.price_kobo)
    }

    /// Extended value of the stock on hand at selling price. Saturates.
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.price().saturating_multiply_quantity(self.stock_quantity.max(0))
    }

    /// Checks whether `quantity` units can be taken from stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.is_active && self.stock_quantity >= quantity
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub sku: String,
    #[serde(default)]
    pub barcode: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub price_kobo: i64,
    #[serde(default)]
    pub cost_price_kobo: Option<i64>,
    /// Opening stock, recorded as an adjustment movement.
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub reorder_level: Option<i64>,
}

/// Partial update of a product. `None` leaves a field unchanged.
///
/// Stock is not here: on-hand quantity only changes through
/// stock movements.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price_kobo: Option<i64>,
    #[serde(default)]
    pub cost_price_kobo: Option<i64>,
    /// Removes the recorded cost price. Wins over `cost_price_kobo`.
    #[serde(default)]
    pub clear_cost_price: bool,
    #[serde(default)]
    pub reorder_level: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer optionally attached to a sale. Duplicates are allowed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale. The only transition is `Completed → Voided`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Completed,
    Voided,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Completed
    }
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Completed => "completed",
            SaleStatus::Voided => "voided",
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    /// Bank transfer.
    Transfer,
    /// Card on a POS terminal.
    Pos,
    /// Mobile money.
    Mobile,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Transfer => "Bank Transfer",
            PaymentMethod::Pos => "POS",
            PaymentMethod::Mobile => "Mobile Money",
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale. Immutable apart from the void fields.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub receipt_number: String,
    pub status: SaleStatus,
    pub subtotal_kobo: i64,
    pub tax_kobo: i64,
    /// VAT rate in force when the sale was made.
    pub tax_rate_bps: u32,
    pub discount_kobo: i64,
    pub total_kobo: i64,
    pub amount_paid_kobo: i64,
    pub change_kobo: i64,
    pub payment_method: PaymentMethod,
    pub customer_id: Option<String>,
    pub user_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub voided_at: Option<DateTime<Utc>>,
    pub void_reason: Option<String>,
    pub voided_by: Option<String>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_kobo(self.total_kobo)
    }

    #[inline]
    pub fn is_voided(&self) -> bool {
        self.status == SaleStatus::Voided
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line of a sale. SKU, name and price are frozen at sale time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub sku_snapshot: String,
    pub name_snapshot: String,
    pub quantity: i64,
    pub unit_price_kobo: i64,
    /// unit_price × quantity
    pub subtotal_kobo: i64,
}

/// A sale with its line items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetail {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Stock Movement
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Goods received from a supplier.
    Purchase,
    /// Goods sold at checkout.
    Sale,
    /// Manual correction (count, damage, opening stock).
    Adjustment,
    /// Goods returned to stock, including voided sales.
    Return,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Purchase => "purchase",
            MovementType::Sale => "sale",
            MovementType::Adjustment => "adjustment",
            MovementType::Return => "return",
        }
    }
}

/// An append-only audit row for a change to on-hand stock.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    /// Signed delta applied to stock.
    pub quantity: i64,
    pub movement_type: MovementType,
    pub stock_before: i64,
    pub stock_after: i64,
    /// Receipt number, supplier invoice, ...
    pub reference: Option<String>,
    pub notes: Option<String>,
    /// User id of the actor.
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Input for a manual stock adjustment.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockAdjustment {
    pub product_id: String,
    /// Signed, non-zero.
    pub quantity: i64,
    pub movement_type: MovementType,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// User
// =============================================================================

/// A staff account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    /// argon2 PHC string. Never leaves the server.
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub last_login: Option<DateTime<Utc>>,
}

/// Input for creating a staff account. The password is hashed by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
    pub role: Role,
}

// =============================================================================
// Reporting
// =============================================================================

/// Completed-sale totals for the dashboard. Voided sales are counted
/// separately and excluded from the money figures.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub total_sales_kobo: i64,
    pub total_transactions: i64,
    pub today_sales_kobo: i64,
    pub today_transactions: i64,
    /// total_sales / total_transactions, truncated to the kobo.
    pub average_sale_kobo: i64,
    pub voided_transactions: i64,
}

/// A best seller over a reporting window.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TopProduct {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue_kobo: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64, active: bool) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            sku: "MILO-400G".to_string(),
            barcode: None,
            name: "Milo 400g".to_string(),
            description: None,
            category: "Beverages".to_string(),
            price_kobo: 250_000,
            cost_price_kobo: None,
            stock_quantity: stock,
            reorder_level: 10,
            is_active: active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_tax_rate_from_fraction() {
        assert_eq!(TaxRate::from_fraction(0.075).bps(), 750);
        assert!((TaxRate::from_bps(750).percentage() - 7.5).abs() < 0.001);
    }

    #[test]
    fn test_product_can_sell() {
        assert!(product(5, true).can_sell(5));
        assert!(!product(5, true).can_sell(6));
        assert!(!product(5, false).can_sell(1));
    }

    #[test]
    fn test_stock_value() {
        assert_eq!(product(4, true).stock_value().kobo(), 1_000_000);
        assert_eq!(product(0, true).stock_value().kobo(), 0);
    }

    #[test]
    fn test_payment_method_wire_names() {
        let json = serde_json::to_string(&PaymentMethod::Transfer).unwrap();
        assert_eq!(json, "\"transfer\"");
        let parsed: PaymentMethod = serde_json::from_str("\"pos\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Pos);
    }

    #[test]
    fn test_user_never_serializes_password_hash() {
        let user = User {
            id: "u-1".to_string(),
            username: "ada".to_string(),
            full_name: "Ada Obi".to_string(),
            email: None,
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Cashier,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"cashier\""));
    }
}
