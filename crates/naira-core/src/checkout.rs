//! # Checkout
//!
//! Pure half of sale completion: prices the cart, validates the tender, and
//! produces a [`CheckoutPlan`] that the database layer commits atomically.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart + CheckoutRequest + StoreSettings                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  plan_checkout() ← THIS MODULE (no I/O)                                 │
//! │       ├── cart empty?               → EmptyCart                         │
//! │       ├── subtotal = Σ lines                                            │
//! │       ├── tax = subtotal × VAT (half up)                                │
//! │       ├── discount > subtotal + tax → DiscountTooLarge                  │
//! │       ├── total = subtotal + tax − discount                             │
//! │       └── paid < total?             → InsufficientPayment               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CheckoutPlan ──► naira-db SaleRepository::checkout (one transaction)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartLine};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::settings::StoreSettings;
use crate::types::{PaymentMethod, TaxRate};

// =============================================================================
// Request
// =============================================================================

/// What the cashier submits at the till.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
    pub amount_paid_kobo: i64,
    #[serde(default)]
    pub discount_kobo: i64,
    #[serde(default)]
    pub customer_id: Option<String>,
}

// =============================================================================
// Totals
// =============================================================================

/// Monetary summary of a sale. `total = subtotal + tax − discount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Prices lines at `tax_rate` with an absolute discount in kobo.
    pub fn compute(lines: &[CartLine], tax_rate: TaxRate, discount: Money) -> CoreResult<Self> {
        if discount.is_negative() {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        let line_totals = lines
            .iter()
            .map(CartLine::subtotal)
            .collect::<CoreResult<Vec<Money>>>()?;
        let subtotal = Money::checked_sum(line_totals)?;
        let tax = subtotal.calculate_tax(tax_rate);
        let due = subtotal
            .checked_add(tax)
            .ok_or(CoreError::AmountOverflow)?;

        if discount > due {
            return Err(CoreError::DiscountTooLarge { discount, due });
        }

        Ok(SaleTotals {
            subtotal,
            tax,
            discount,
            total: due - discount,
        })
    }

    /// Checks that `paid` covers the total and computes change.
    pub fn tender(&self, paid: Money) -> CoreResult<Tender> {
        if paid.is_negative() {
            return Err(ValidationError::MustBePositive {
                field: "amount_paid".to_string(),
            }
            .into());
        }
        if paid < self.total {
            return Err(CoreError::InsufficientPayment {
                total: self.total,
                tendered: paid,
            });
        }
        Ok(Tender {
            amount_paid: paid,
            change: paid - self.total,
        })
    }
}

/// Accepted payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Tender {
    pub amount_paid: Money,
    pub change: Money,
}

// =============================================================================
// Plan
// =============================================================================

/// A validated sale, ready to be committed.
#[derive(Debug, Clone)]
pub struct CheckoutPlan {
    pub lines: Vec<CartLine>,
    pub totals: SaleTotals,
    /// VAT rate the totals were priced at, stored on the sale.
    pub tax_rate: TaxRate,
    pub tender: Tender,
    pub payment_method: PaymentMethod,
    pub customer_id: Option<String>,
    pub cashier_id: String,
    /// Store-local business day, used for the receipt sequence.
    pub business_day: NaiveDate,
}

/// Validates a checkout without touching storage.
///
/// ## Arguments
/// * `cart` - the session cart (copied into the plan)
/// * `request` - payment method, tender, discount, customer
/// * `settings` - snapshot of store settings; only the VAT rate is read
/// * `cashier_id` - the authenticated user
/// * `business_day` - store-local date, see [`business_day`]
pub fn plan_checkout(
    cart: &Cart,
    request: &CheckoutRequest,
    settings: &StoreSettings,
    cashier_id: &str,
    business_day: NaiveDate,
) -> CoreResult<CheckoutPlan> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let tax_rate = settings.tax_rate();
    let totals = SaleTotals::compute(
        &cart.lines,
        tax_rate,
        Money::from_kobo(request.discount_kobo),
    )?;
    let tender = totals.tender(Money::from_kobo(request.amount_paid_kobo))?;

    Ok(CheckoutPlan {
        lines: cart.lines.clone(),
        totals,
        tax_rate,
        tender,
        payment_method: request.payment_method,
        customer_id: request
            .customer_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        cashier_id: cashier_id.to_string(),
        business_day,
    })
}

// =============================================================================
// Receipt Numbers
// =============================================================================

/// Store-local calendar date for a UTC instant.
pub fn business_day(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// UTC half-open range `[start, end)` covering a store-local day.
///
/// Days at the edge of the representable calendar have no such range and
/// are reported as out of range for `day`.
pub fn day_bounds(
    day: NaiveDate,
    offset: FixedOffset,
) -> CoreResult<(DateTime<Utc>, DateTime<Utc>)> {
    let local_midnight = day.and_time(NaiveTime::MIN);
    let bounds = local_midnight
        .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
        .and_then(|utc_midnight| {
            let end = utc_midnight.checked_add_signed(Duration::days(1))?;
            Some((
                Utc.from_utc_datetime(&utc_midnight),
                Utc.from_utc_datetime(&end),
            ))
        });

    bounds.ok_or_else(|| {
        ValidationError::OutOfRange {
            field: "day".to_string(),
            min: i64::from(NaiveDate::MIN.year()),
            max: i64::from(NaiveDate::MAX.year()),
        }
        .into()
    })
}

/// Sequence key stored in the per-day counter table, e.g. `20261015`.
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y%m%d").to_string()
}

/// `REC-YYYYMMDD-NNNN`. Sequences above 9999 widen rather than wrap.
///
/// ```rust
/// use chrono::NaiveDate;
/// use naira_core::checkout::format_receipt_number;
///
/// let day = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
/// assert_eq!(format_receipt_number(day, 7), "REC-20261015-0007");
/// ```
pub fn format_receipt_number(day: NaiveDate, sequence: i64) -> String {
    format!("REC-{}-{:04}", day_key(day), sequence)
}

// =============================================================================
// Unit Tests
// =============================================================================
