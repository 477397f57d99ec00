//! # Cart
//!
//! The per-session basket a cashier builds before checkout.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation            Check                         Effect              │
//! │  ─────────            ─────                         ──────              │
//! │  add(p, q)            active, 1 ≤ q, existing+q ≤   merge or push line  │
//! │                       stock, existing+q ≤ 999                           │
//! │  set_quantity(p, q)   q = 0 → remove; else active,  line.quantity = q   │
//! │                       q ≤ stock                                         │
//! │  remove(id)           line exists                   line dropped        │
//! │  clear()              -                             lines emptied       │
//! │  subtotal()/total()   -                             Σ line subtotals    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unit prices are frozen when a line is first added. Stock is checked here
//! against the product the caller just loaded, and checked again atomically
//! at checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, TaxRate};
use crate::validation::{validate_price_kobo, validate_quantity};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    /// Price captured when the line was added.
    pub unit_price_kobo: i64,
    pub quantity: i64,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a line, freezing the product's current price.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            sku: product.sku.clone(),
            name: product.name.clone(),
            unit_price_kobo: product.price_kobo,
            quantity,
            added_at: Utc::now(),
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_kobo(self.unit_price_kobo)
    }

    /// quantity × unit price
    #[inline]
    pub fn subtotal(&self) -> CoreResult<Money> {
        self.unit_price()
            .multiply_quantity(self.quantity)
            .ok_or(CoreError::AmountOverflow)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// An ordered list of lines, unique by `product_id`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    pub lines: Vec<CartLine>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds `quantity` of `product`, merging into an existing line.
    ///
    /// ## Errors
    /// - `ProductInactive` if the product is soft-deleted
    /// - `Validation` if `quantity` is not in `1..=999`, or the product's
    ///   price is outside `1..=MAX_PRICE_KOBO`
    /// - `InsufficientStock` if the cumulative quantity exceeds stock on hand
    /// - `QuantityTooLarge` if the cumulative quantity exceeds 999
    /// - `CartTooLarge` if a new line would exceed 100 lines
    ///
    /// The cart is unchanged on error.
    pub fn add(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        check_sellable(product)?;
        validate_quantity(quantity)?;

        let existing = self.quantity_of(&product.id);
        let requested = existing + quantity;

        if requested > product.stock_quantity {
            return Err(CoreError::InsufficientStock {
                sku: product.sku.clone(),
                available: product.stock_quantity.max(0),
                requested,
            });
        }
        if requested > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if let Some(line) = self.line_mut(&product.id) {
            line.quantity = requested;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Replaces the quantity of the product's line. Zero removes the line.
    ///
    /// The frozen unit price of an existing line is kept. Same product
    /// checks as [`Cart::add`]; removing a line is always allowed.
    pub fn set_quantity(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            self.remove(&product.id);
            return Ok(());
        }
        check_sellable(product)?;
        validate_quantity(quantity)?;

        if quantity > product.stock_quantity {
            return Err(CoreError::InsufficientStock {
                sku: product.sku.clone(),
                available: product.stock_quantity.max(0),
                requested: quantity,
            });
        }

        match self.line_mut(&product.id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => self.add(product, quantity),
        }
    }

    /// Removes the product's line. Returns false if it was not in the cart.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    /// Quantity of the product currently in the cart (0 if absent).
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ line subtotals, before tax and discount.
    pub fn subtotal(&self) -> CoreResult<Money> {
        let lines = self
            .lines
            .iter()
            .map(CartLine::subtotal)
            .collect::<CoreResult<Vec<Money>>>()?;
        Money::checked_sum(lines)
    }

    /// Same as [`Cart::subtotal`]: the cart's own total excludes tax, which
    /// is applied at checkout from the store settings.
    pub fn total(&self) -> CoreResult<Money> {
        self.subtotal()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

/// Active, and priced within the till's limits.
fn check_sellable(product: &Product) -> CoreResult<()> {
    if !product.is_active {
        return Err(CoreError::ProductInactive {
            sku: product.sku.clone(),
        });
    }
    validate_price_kobo(product.price_kobo)?;
    Ok(())
}

// =============================================================================
// Cart View
// =============================================================================

/// Cart contents with a tax preview for the till display.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal_kobo: i64,
    pub tax_kobo: i64,
    /// subtotal + tax, before any discount given at checkout
    pub total_kobo: i64,
    pub tax_rate_bps: u32,
}

impl CartView {
    pub fn new(cart: &Cart, tax_rate: TaxRate) -> CoreResult<Self> {
        let subtotal = cart.subtotal()?;
        let tax = subtotal.calculate_tax(tax_rate);
        let total = subtotal.checked_add(tax).ok_or(CoreError::AmountOverflow)?;
        Ok(CartView {
            lines: cart.lines.clone(),
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            subtotal_kobo: subtotal.kobo(),
            tax_kobo: tax.kobo(),
            total_kobo: total.kobo(),
            tax_rate_bps: tax_rate.bps(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_PRICE_KOBO;

    fn product(id: &str, price_kobo: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            sku: format!("SKU-{id}"),
            barcode: None,
            name: format!("Product {id}"),
            description: None,
            category: "General".to_string(),
            price_kobo,
            cost_price_kobo: None,
            stock_quantity: stock,
            reorder_level: 10,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new();
        let a = product("A", 100_000, 10);

        cart.add(&a, 2).unwrap();
        cart.add(&a, 3).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity_of("A"), 5);
        assert_eq!(cart.subtotal().unwrap().kobo(), 500_000);
    }

    #[test]
    fn test_add_rejects_cumulative_quantity_over_stock() {
        let mut cart = Cart::new();
        let a = product("A", 100_000, 3);

        cart.add(&a, 2).unwrap();
        let err = cart.add(&a, 2).unwrap_err();

        match err {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 3);
                assert_eq!(requested, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(cart.quantity_of("A"), 2);
    }

    #[test]
    fn test_add_rejects_inactive_and_invalid_quantity() {
        let mut cart = Cart::new();
        let mut a = product("A", 100_000, 10);

        assert!(matches!(cart.add(&a, 0), Err(CoreError::Validation(_))));
        a.is_active = false;
        assert!(matches!(cart.add(&a, 1), Err(CoreError::ProductInactive { .. })));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_price_is_frozen_at_add_time() {
        let mut cart = Cart::new();
        let mut a = product("A", 100_000, 10);
        cart.add(&a, 1).unwrap();

        a.price_kobo = 150_000;
        cart.add(&a, 1).unwrap();

        assert_eq!(cart.lines[0].unit_price_kobo, 100_000);
        assert_eq!(cart.total().unwrap().kobo(), 200_000);
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let mut cart = Cart::new();
        let a = product("A", 100_000, 10);
        let b = product("B", 50_000, 10);
        cart.add(&a, 1).unwrap();
        cart.add(&b, 1).unwrap();

        cart.set_quantity(&a, 4).unwrap();
        assert_eq!(cart.quantity_of("A"), 4);
        assert!(cart.set_quantity(&a, 11).is_err());

        cart.set_quantity(&a, 0).unwrap();
        assert_eq!(cart.line_count(), 1);

        assert!(cart.remove("B"));
        assert!(!cart.remove("B"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_rejects_deactivated_product() {
        let mut cart = Cart::new();
        let mut a = product("A", 100_000, 10);
        cart.add(&a, 2).unwrap();

        a.is_active = false;
        assert!(matches!(
            cart.set_quantity(&a, 3),
            Err(CoreError::ProductInactive { .. })
        ));
        assert_eq!(cart.quantity_of("A"), 2);

        // Taking it out of the cart still works
        cart.set_quantity(&a, 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_rejects_price_beyond_limit() {
        let mut cart = Cart::new();
        let a = product("A", 4_611_686_018_427_387_904, 5);

        assert!(matches!(cart.add(&a, 2), Err(CoreError::Validation(_))));
        assert!(cart.is_empty());

        cart.add(&product("B", MAX_PRICE_KOBO, 999), MAX_ITEM_QUANTITY).unwrap();
        assert_eq!(
            cart.subtotal().unwrap().kobo(),
            MAX_PRICE_KOBO * MAX_ITEM_QUANTITY
        );
    }

    #[test]
    fn test_overflowing_line_is_an_error() {
        let mut cart = Cart::new();
        cart.lines.push(CartLine {
            product_id: "X".to_string(),
            sku: "SKU-X".to_string(),
            name: "Product X".to_string(),
            unit_price_kobo: i64::MAX / 2,
            quantity: 3,
            added_at: Utc::now(),
        });

        assert!(matches!(cart.subtotal(), Err(CoreError::AmountOverflow)));
        assert!(CartView::new(&cart, TaxRate::from_bps(750)).is_err());
    }

    #[test]
    fn test_cart_view_matches_store_example() {
        let mut cart = Cart::new();
        cart.add(&product("A", 100_000, 10), 2).unwrap();
        cart.add(&product("B", 50_000, 10), 1).unwrap();

        let view = CartView::new(&cart, TaxRate::from_bps(750)).unwrap();
        assert_eq!(view.subtotal_kobo, 250_000);
        assert_eq!(view.tax_kobo, 18_750);
        assert_eq!(view.total_kobo, 268_750);
        assert_eq!(view.total_quantity, 3);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(&product("A", 100_000, 10), 2).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.subtotal().unwrap().is_zero());
    }
}
