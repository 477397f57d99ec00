//! # naira-core: Pure Business Logic for Naira POS
//!
//! Everything the store's rules depend on lives here as pure functions and
//! plain data. The database and HTTP layers call into this crate; it never
//! calls out.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Naira POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 naira-server (axum JSON API)                    │   │
//! │  │    login ──► catalog ──► cart ──► checkout ──► receipt          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ naira-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌──────────┐ ┌────────┐ │   │
//! │  │   │  money  │ │  cart   │ │ checkout │ │inventory │ │ access │ │   │
//! │  │   │  Money  │ │  Cart   │ │ pricing  │ │  status  │ │ matrix │ │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └──────────┘ └────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    naira-db (Database Layer)                    │   │
//! │  │        SQLite queries, migrations, atomic units of work         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, StockMovement, User, ...)
//! - [`money`] - Money in kobo with integer arithmetic
//! - [`cart`] - Session cart and its stock-aware merge rules
//! - [`checkout`] - Sale totals, tender validation, receipt numbers
//! - [`inventory`] - Stock status classification and adjustment rules
//! - [`access`] - Roles, capabilities and the permission matrix
//! - [`receipt`] - Receipt view model and thermal-printer text
//! - [`settings`] - Store settings passed explicitly into checkout
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use naira_core::money::Money;
//! use naira_core::types::TaxRate;
//!
//! let price = Money::from_kobo(250_000); // ₦2,500.00
//! let vat = TaxRate::from_bps(750);      // 7.5%
//!
//! assert_eq!(price.calculate_tax(vat).kobo(), 18_750);
//! assert_eq!(price.to_string(), "₦2,500.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod cart;
pub mod checkout;
pub mod error;
pub mod inventory;
pub mod money;
pub mod receipt;
pub mod settings;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{Capability, PermissionMatrix, Role};
pub use cart::{Cart, CartLine};
pub use checkout::{SaleTotals, Tender};
pub use error::{CoreError, CoreResult, ValidationError};
pub use inventory::StockStatus;
pub use money::Money;
pub use receipt::{Receipt, ReceiptLine};
pub use settings::StoreSettings;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in the cart.
///
/// Guards against typing 1000 instead of 10 at the till.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest unit price or cost price a product may carry: ₦1,000,000,000.00.
///
/// With [`MAX_ITEM_QUANTITY`] and [`MAX_CART_ITEMS`] this keeps every cart
/// total far inside `i64` kobo.
pub const MAX_PRICE_KOBO: i64 = 100_000_000_000;

/// Highest stock on hand, opening stock, reorder level or single adjustment.
pub const MAX_STOCK_QUANTITY: i64 = 10_000_000;

/// Category assigned when a product is created without one.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Reorder level assigned when a product is created without one.
pub const DEFAULT_REORDER_LEVEL: i64 = 10;

/// Nigerian VAT in basis points (7.5%).
pub const DEFAULT_VAT_BPS: u32 = 750;
