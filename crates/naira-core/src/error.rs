//! # Error Types
//!
//! Domain-specific error types for naira-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  naira-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule rejections                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  naira-db errors                                                       │
//! │  └── DbError          - Database failures, wraps CoreError when a      │
//! │                         rule fails inside a transaction                │
//! │                                                                         │
//! │  naira-server errors                                                   │
//! │  └── ApiError         - { code, message } JSON + HTTP status           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// Every variant is reported to the caller as a rejection with a readable
/// reason. None of them are retried.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The product has been soft-deleted and cannot be sold.
    #[error("Product {sku} is not available for sale")]
    ProductInactive { sku: String },

    /// Requested quantity exceeds stock on hand.
    ///
    /// ## When This Occurs
    /// - Cart add whose cumulative quantity exceeds current stock
    /// - Checkout where stock dropped after the line was added
    /// - Manual adjustment that would take stock below zero
    ///
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// stock on hand = 3
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "INDOMIE-70G", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// "Only 3 INDOMIE-70G in stock"
    /// ```
    #[error("Only {available} {sku} in stock (requested {requested})")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Tendered amount does not cover the total.
    #[error("Insufficient payment. Total: {total}, paid: {tendered}")]
    InsufficientPayment { total: Money, tendered: Money },

    /// Discount larger than subtotal plus tax.
    #[error("Discount {discount} exceeds amount due {due}")]
    DiscountTooLarge { discount: Money, due: Money },

    /// A line, subtotal or total does not fit in an i64 of kobo.
    #[error("Amount is too large to record")]
    AmountOverflow,

    /// Hard delete refused for a product referenced by past sales.
    #[error("Product {sku} has sales history and can only be deactivated")]
    HasSalesHistory { sku: String },

    /// The only active admin cannot be deactivated.
    #[error("Cannot deactivate the last active admin")]
    LastAdmin,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (SKU, barcode, username).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Duplicate`].
    pub fn duplicate(field: &str, value: impl Into<String>) -> Self {
        ValidationError::Duplicate {
            field: field.to_string(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            sku: "INDOMIE-70G".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(err.to_string(), "Only 3 INDOMIE-70G in stock (requested 5)");
    }

    #[test]
    fn test_insufficient_payment_message_uses_naira() {
        let err = CoreError::InsufficientPayment {
            total: Money::from_kobo(268_750),
            tendered: Money::from_kobo(200_000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient payment. Total: ₦2,687.50, paid: ₦2,000.00"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::duplicate("sku", "RICE-5KG").into();
        assert!(matches!(core_err, CoreError::Validation(ValidationError::Duplicate { .. })));
        assert_eq!(
            core_err.to_string(),
            "Validation error: sku 'RICE-5KG' already exists"
        );
    }
}
