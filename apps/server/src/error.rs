//! # API Errors
//!
//! Every failure leaves the server as `{ "code": "...", "message": "..." }`
//! with an HTTP status derived from the code.
//!
//! ## Mapping
//! ```text
//! ┌─────────────────────────────┬──────────────────────────┬────────┐
//! │ Source                      │ ErrorCode                │ Status │
//! ├─────────────────────────────┼──────────────────────────┼────────┤
//! │ ValidationError             │ VALIDATION_ERROR         │  400   │
//! │ ValidationError::Duplicate  │ DUPLICATE                │  409   │
//! │ DbError::NotFound           │ NOT_FOUND                │  404   │
//! │ InsufficientStock           │ INSUFFICIENT_STOCK       │  409   │
//! │ InsufficientPayment         │ INSUFFICIENT_PAYMENT     │  422   │
//! │ DiscountTooLarge            │ DISCOUNT_TOO_LARGE       │  422   │
//! │ EmptyCart                   │ EMPTY_CART               │  422   │
//! │ CartTooLarge / QtyTooLarge  │ CART_LIMIT               │  422   │
//! │ HasSalesHistory             │ HAS_SALES_HISTORY        │  409   │
//! │ LastAdmin                   │ LAST_ADMIN               │  409   │
//! │ sqlx / pool / migration     │ DATABASE_ERROR           │  500   │
//! └─────────────────────────────┴──────────────────────────┴────────┘
//! ```
//!
//! 500s carry a generic message; the detail goes to the log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::state::SessionError;
use naira_core::{CoreError, ValidationError};
use naira_db::DbError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    Unauthorized,
    Forbidden,
    NotFound,
    Duplicate,
    InsufficientStock,
    InsufficientPayment,
    DiscountTooLarge,
    EmptyCart,
    CartLimit,
    ProductInactive,
    HasSalesHistory,
    LastAdmin,
    CheckoutInProgress,
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Duplicate
            | ErrorCode::InsufficientStock
            | ErrorCode::ProductInactive
            | ErrorCode::HasSalesHistory
            | ErrorCode::LastAdmin
            | ErrorCode::CheckoutInProgress => StatusCode::CONFLICT,
            ErrorCode::InsufficientPayment
            | ErrorCode::DiscountTooLarge
            | ErrorCode::EmptyCart
            | ErrorCode::CartLimit => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error body returned by every handler.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Logs `detail` and hides it from the client.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        Self::new(ErrorCode::InternalError, "Internal server error")
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        let code = match error {
            ValidationError::Duplicate { .. } => ErrorCode::Duplicate,
            _ => ErrorCode::ValidationError,
        };
        ApiError::new(code, error.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        let code = match &error {
            CoreError::Validation(ValidationError::Duplicate { .. }) => ErrorCode::Duplicate,
            CoreError::Validation(_) | CoreError::AmountOverflow => ErrorCode::ValidationError,
            CoreError::ProductNotFound(_)
            | CoreError::SaleNotFound(_)
            | CoreError::CustomerNotFound(_) => ErrorCode::NotFound,
            CoreError::ProductInactive { .. } => ErrorCode::ProductInactive,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::InsufficientPayment { .. } => ErrorCode::InsufficientPayment,
            CoreError::DiscountTooLarge { .. } => ErrorCode::DiscountTooLarge,
            CoreError::EmptyCart => ErrorCode::EmptyCart,
            CoreError::CartTooLarge { .. } | CoreError::QuantityTooLarge { .. } => {
                ErrorCode::CartLimit
            }
            CoreError::HasSalesHistory { .. } => ErrorCode::HasSalesHistory,
            CoreError::LastAdmin => ErrorCode::LastAdmin,
        };
        let message = match error {
            CoreError::Validation(inner) => inner.to_string(),
            other => other.to_string(),
        };
        ApiError::new(code, message)
    }
}

impl From<DbError> for ApiError {
    fn from(error: DbError) -> Self {
        match error {
            DbError::Rejected(core) => core.into(),
            DbError::NotFound { .. } => ApiError::not_found(error.to_string()),
            DbError::UniqueViolation { .. } => ApiError::new(ErrorCode::Duplicate, error.to_string()),
            DbError::ForeignKeyViolation { .. } => ApiError::validation(error.to_string()),
            other => {
                tracing::error!(error = %other, "Database error");
                ApiError::new(ErrorCode::DatabaseError, "Database error")
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(error: ConfigError) -> Self {
        ApiError::internal(error)
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Expired => {
                ApiError::unauthorized("Session expired, please log in again")
            }
            SessionError::CheckoutInProgress => ApiError::new(
                ErrorCode::CheckoutInProgress,
                "A checkout is already in progress for this session",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use naira_core::Money;

    #[test]
    fn test_insufficient_stock_is_conflict() {
        let err: ApiError = DbError::Rejected(CoreError::InsufficientStock {
            sku: "INDOMIE-70G".to_string(),
            available: 3,
            requested: 5,
        })
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.code.status(), StatusCode::CONFLICT);
        assert!(err.message.contains("Only 3 INDOMIE-70G"));
    }

    #[test]
    fn test_insufficient_payment_names_total() {
        let err: ApiError = CoreError::InsufficientPayment {
            total: Money::from_kobo(268_750),
            tendered: Money::from_kobo(200_000),
        }
        .into();
        assert_eq!(err.code.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.message.contains("₦2,687.50"));
    }

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let err: ApiError = DbError::Rejected(CoreError::Validation(ValidationError::duplicate(
            "sku", "RICE-5KG",
        )))
        .into();
        assert_eq!(err.code, ErrorCode::Duplicate);
        assert_eq!(err.code.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_amount_overflow_is_bad_request() {
        let err: ApiError = DbError::Rejected(CoreError::AmountOverflow).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Amount is too large to record");
    }

    #[test]
    fn test_out_of_range_day_is_bad_request() {
        let offset = chrono::FixedOffset::east_opt(3600).unwrap();
        let err: ApiError = naira_core::checkout::day_bounds(chrono::NaiveDate::MIN, offset)
            .unwrap_err()
            .into();
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
        assert!(err.message.contains("day"));
    }

    #[test]
    fn test_database_detail_hidden() {
        let err: ApiError = DbError::QueryFailed("no such table: sales".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database error");
    }

    #[test]
    fn test_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::CheckoutInProgress).unwrap();
        assert_eq!(json, "\"CHECKOUT_IN_PROGRESS\"");
    }
}
