//! # Money Module
//!
//! Provides the `Money` type for Naira amounts.
//!
//! ## Integer Kobo
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ₦1 = 100 kobo                                                          │
//! │                                                                         │
//! │  Every amount in the system is an i64 count of kobo:                    │
//! │    product price, cart line, subtotal, VAT, discount, tender, change    │
//! │                                                                         │
//! │  ₦2,687.50  ⇔  268_750 kobo                                            │
//! │                                                                         │
//! │  Floats never touch money. Display formatting is the only place the    │
//! │  decimal point appears.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use naira_core::money::Money;
//!
//! let price = Money::from_kobo(100_000); // ₦1,000.00
//! let line = price.multiply_quantity(2).unwrap();
//! assert_eq!(line.kobo(), 200_000);
//! assert_eq!(line.to_string(), "₦2,000.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::TaxRate;

/// Symbol used by [`Money`]'s `Display` impl.
pub const NAIRA_SYMBOL: &str = "₦";

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in kobo (1/100 of a Naira).
///
/// Signed so that a void or a discount can be expressed as a negative
/// movement without a separate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from kobo.
    #[inline]
    pub const fn from_kobo(kobo: i64) -> Self {
        Money(kobo)
    }

    /// Creates a Money value from whole Naira and kobo.
    ///
    /// ```rust
    /// use naira_core::money::Money;
    ///
    /// assert_eq!(Money::from_naira(2687, 50).kobo(), 268_750);
    /// assert_eq!(Money::from_naira(-5, 50).kobo(), -550);
    /// ```
    #[inline]
    pub const fn from_naira(naira: i64, kobo: i64) -> Self {
        if naira < 0 {
            Money(naira * 100 - kobo)
        } else {
            Money(naira * 100 + kobo)
        }
    }

    /// Returns the value in kobo.
    #[inline]
    pub const fn kobo(&self) -> i64 {
        self.0
    }

    /// Returns the whole-Naira portion (truncated toward zero).
    #[inline]
    pub const fn naira(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the kobo portion (always 0-99).
    #[inline]
    pub const fn kobo_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax on this amount, rounding half up to the nearest kobo.
    ///
    /// `(amount × bps + 5000) / 10000`, computed in i128.
    ///
    /// ```rust
    /// use naira_core::money::Money;
    /// use naira_core::types::TaxRate;
    ///
    /// // ₦2,500.00 at 7.5% VAT = ₦187.50
    /// let tax = Money::from_kobo(250_000).calculate_tax(TaxRate::from_bps(750));
    /// assert_eq!(tax.kobo(), 18_750);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_kobo(tax as i64)
    }

    /// Multiplies a unit price by a quantity. `None` on overflow.
    ///
    /// ```rust
    /// use naira_core::money::Money;
    ///
    /// assert_eq!(Money::from_kobo(15_000).multiply_quantity(3), Some(Money::from_kobo(45_000)));
    /// assert_eq!(Money::from_kobo(i64::MAX / 2).multiply_quantity(3), None);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(kobo) => Some(Money(kobo)),
            None => None,
        }
    }

    /// Like [`multiply_quantity`](Self::multiply_quantity) but clamps at the
    /// `i64` limits. Only for report figures, never for amounts charged.
    #[inline]
    pub const fn saturating_multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(kobo) => Some(Money(kobo)),
            None => None,
        }
    }

    /// Sums amounts, failing with `AmountOverflow` instead of wrapping.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> CoreResult<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
            .ok_or(CoreError::AmountOverflow)
    }

    /// Formats with an explicit currency symbol, e.g. `"NGN "` for printers
    /// that cannot render `₦`.
    ///
    /// ```rust
    /// use naira_core::money::Money;
    ///
    /// assert_eq!(Money::from_kobo(123_456_789).format_with("NGN "), "NGN 1,234,567.89");
    /// assert_eq!(Money::from_kobo(-31_250).format_with("₦"), "-₦312.50");
    /// ```
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            group_thousands(self.naira().unsigned_abs()),
            self.kobo_part()
        )
    }
}

/// Inserts `,` separators every three digits.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders as `₦1,234.56`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with(NAIRA_SYMBOL))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_kobo() {
        let money = Money::from_kobo(268_750);
        assert_eq!(money.kobo(), 268_750);
        assert_eq!(money.naira(), 2687);
        assert_eq!(money.kobo_part(), 50);
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_kobo(0).to_string(), "₦0.00");
        assert_eq!(Money::from_kobo(50).to_string(), "₦0.50");
        assert_eq!(Money::from_kobo(99_999).to_string(), "₦999.99");
        assert_eq!(Money::from_kobo(100_000).to_string(), "₦1,000.00");
        assert_eq!(Money::from_kobo(268_750).to_string(), "₦2,687.50");
        assert_eq!(Money::from_kobo(100_000_000_00).to_string(), "₦100,000,000.00");
        assert_eq!(Money::from_kobo(-31_250).to_string(), "-₦312.50");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_kobo(1000);
        let b = Money::from_kobo(500);

        assert_eq!((a + b).kobo(), 1500);
        assert_eq!((a - b).kobo(), 500);
        assert_eq!((a * 3).kobo(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.kobo(), 2000);
    }

    #[test]
    fn test_vat_on_store_example() {
        // 2 × ₦1,000 + 1 × ₦500 at 7.5%
        let subtotal = Money::from_kobo(250_000);
        let tax = subtotal.calculate_tax(TaxRate::from_bps(750));
        assert_eq!(tax.kobo(), 18_750);
        assert_eq!((subtotal + tax).to_string(), "₦2,687.50");
    }

    #[test]
    fn test_tax_rounds_half_up() {
        // 10 kobo at 7.5% = 0.75 kobo → 1
        assert_eq!(Money::from_kobo(10).calculate_tax(TaxRate::from_bps(750)).kobo(), 1);
        // 6 kobo at 7.5% = 0.45 kobo → 0
        assert_eq!(Money::from_kobo(6).calculate_tax(TaxRate::from_bps(750)).kobo(), 0);
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let huge = Money::from_kobo(i64::MAX - 10);
        assert_eq!(huge.checked_add(Money::from_kobo(10)), Some(Money::from_kobo(i64::MAX)));
        assert_eq!(huge.checked_add(Money::from_kobo(11)), None);
        assert_eq!(Money::from_kobo(4_611_686_018_427_387_904).multiply_quantity(2), None);
        assert_eq!(
            Money::from_kobo(i64::MAX / 2).saturating_multiply_quantity(5).kobo(),
            i64::MAX
        );

        let err = Money::checked_sum([huge, Money::from_kobo(100)]).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow));
        assert_eq!(
            Money::checked_sum([Money::from_kobo(1), Money::from_kobo(2)]).unwrap().kobo(),
            3
        );
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_kobo(1).is_positive());
        assert!(Money::from_kobo(-1).is_negative());
    }
}
