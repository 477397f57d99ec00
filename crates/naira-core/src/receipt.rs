//! # Receipt
//!
//! View model returned after checkout and when reprinting, plus a plain-text
//! rendering for 48-column thermal printers.
//!
//! ```text
//!                 Naira POS Store
//! ================================================
//! Lagos, Nigeria
//! Tel: 0800 000 0000
//! ================================================
//! Receipt: REC-20261015-0001
//! Date: 15/10/2026 14:03:11
//! Cashier: Ada Obi
//! ------------------------------------------------
//! Item                    Qty      Price      Total
//! ------------------------------------------------
//! Product A                 2  ₦1,000.00  ₦2,000.00
//! ...
//! ```

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::settings::StoreSettings;
use crate::types::{Customer, PaymentMethod, SaleDetail, SaleItem, SaleStatus, TaxRate, User};

/// Character width of the thermal printer paper.
pub const RECEIPT_WIDTH: usize = 48;

const NAME_WIDTH: usize = 20;

// =============================================================================
// View Model
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptLine {
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price_kobo: i64,
    pub subtotal_kobo: i64,
}

impl From<&SaleItem> for ReceiptLine {
    fn from(item: &SaleItem) -> Self {
        ReceiptLine {
            sku: item.sku_snapshot.clone(),
            name: item.name_snapshot.clone(),
            quantity: item.quantity,
            unit_price_kobo: item.unit_price_kobo,
            subtotal_kobo: item.subtotal_kobo,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Receipt {
    pub sale_id: String,
    pub receipt_number: String,
    pub status: SaleStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// `dd/mm/YYYY HH:MM:SS` in store-local time.
    pub local_time: String,
    pub cashier_username: String,
    pub cashier_name: String,
    pub customer_name: Option<String>,
    pub payment_method: PaymentMethod,
    pub lines: Vec<ReceiptLine>,
    pub subtotal_kobo: i64,
    pub tax_rate_bps: u32,
    pub tax_kobo: i64,
    pub discount_kobo: i64,
    pub total_kobo: i64,
    pub amount_paid_kobo: i64,
    pub change_kobo: i64,
    pub void_reason: Option<String>,
    pub store: StoreSettings,
}

impl Receipt {
    /// Assembles the receipt for a stored sale.
    ///
    /// ## Arguments
    /// * `detail` - sale row and its items
    /// * `cashier` - the user who rang up the sale
    /// * `customer` - attached customer, if any
    /// * `store` - settings snapshot for the header and footer
    /// * `offset` - store UTC offset for the printed time
    pub fn build(
        detail: &SaleDetail,
        cashier: &User,
        customer: Option<&Customer>,
        store: &StoreSettings,
        offset: FixedOffset,
    ) -> Self {
        let sale = &detail.sale;
        Receipt {
            sale_id: sale.id.clone(),
            receipt_number: sale.receipt_number.clone(),
            status: sale.status,
            created_at: sale.created_at,
            local_time: sale
                .created_at
                .with_timezone(&offset)
                .format("%d/%m/%Y %H:%M:%S")
                .to_string(),
            cashier_username: cashier.username.clone(),
            cashier_name: cashier.full_name.clone(),
            customer_name: customer.map(|c| c.name.clone()),
            payment_method: sale.payment_method,
            lines: detail.items.iter().map(ReceiptLine::from).collect(),
            subtotal_kobo: sale.subtotal_kobo,
            tax_rate_bps: sale.tax_rate_bps,
            tax_kobo: sale.tax_kobo,
            discount_kobo: sale.discount_kobo,
            total_kobo: sale.total_kobo,
            amount_paid_kobo: sale.amount_paid_kobo,
            change_kobo: sale.change_kobo,
            void_reason: sale.void_reason.clone(),
            store: store.clone(),
        }
    }

    /// Renders for a thermal printer, one `\n`-separated line per row.
    pub fn render_text(&self) -> String {
        let symbol = self.store.currency_symbol.as_str();
        let fmt = |kobo: i64| Money::from_kobo(kobo).format_with(symbol);
        let double = "=".repeat(RECEIPT_WIDTH);
        let single = "-".repeat(RECEIPT_WIDTH);

        let mut out: Vec<String> = Vec::new();
        out.push(centered(&self.store.store_name));
        out.push(double.clone());
        push_if_set(&mut out, "", &self.store.address);
        push_if_set(&mut out, "Tel: ", &self.store.phone);
        push_if_set(&mut out, "Email: ", &self.store.email);
        push_if_set(&mut out, "Tax ID: ", &self.store.tax_id);
        out.push(double.clone());

        out.push(format!("Receipt: {}", self.receipt_number));
        out.push(format!("Date: {}", self.local_time));
        out.push(format!("Cashier: {}", self.cashier_name));
        if let Some(customer) = &self.customer_name {
            out.push(format!("Customer: {customer}"));
        }
        if self.status == SaleStatus::Voided {
            out.push(centered("*** VOIDED ***"));
        }
        out.push(single.clone());

        out.push(format!("{:<20} {:>6} {:>9} {:>10}", "Item", "Qty", "Price", "Total"));
        out.push(single.clone());
        for line in &self.lines {
            let name: String = line.name.chars().take(NAME_WIDTH).collect();
            out.push(format!(
                "{:<20} {:>6} {:>9} {:>10}",
                name,
                line.quantity,
                fmt(line.unit_price_kobo),
                fmt(line.subtotal_kobo)
            ));
        }
        out.push(single);

        let vat = format!("VAT ({}%):", TaxRate::from_bps(self.tax_rate_bps).percentage());
        out.push(total_row("Subtotal:", &fmt(self.subtotal_kobo)));
        out.push(total_row(&vat, &fmt(self.tax_kobo)));
        if self.discount_kobo > 0 {
            out.push(total_row("Discount:", &format!("-{}", fmt(self.discount_kobo))));
        }
        out.push(total_row("Total:", &fmt(self.total_kobo)));
        out.push(total_row("Paid:", &fmt(self.amount_paid_kobo)));
        out.push(total_row("Change:", &fmt(self.change_kobo)));
        out.push(format!("Payment: {}", self.payment_method.label().to_uppercase()));
        out.push(double);

        push_if_set(&mut out, "", &self.store.receipt_footer);
        out.push(centered("*** THANK YOU ***"));

        out.join("\n")
    }
}

fn centered(text: &str) -> String {
    let len = text.chars().count();
    if len >= RECEIPT_WIDTH {
        return text.to_string();
    }
    format!("{}{}", " ".repeat((RECEIPT_WIDTH - len) / 2), text)
}

fn total_row(label: &str, value: &str) -> String {
    format!("{:<36} {:>11}", label, value)
}

fn push_if_set(out: &mut Vec<String>, prefix: &str, value: &str) {
    if !value.trim().is_empty() {
        out.push(format!("{prefix}{value}"));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Role;
    use crate::types::Sale;

    fn detail(status: SaleStatus) -> SaleDetail {
        let created_at = DateTime::parse_from_rfc3339("2026-10-15T13:03:11Z")
            .unwrap()
            .with_timezone(&Utc);
        let item = |id: &str, name: &str, qty: i64, price: i64| SaleItem {
            id: format!("i-{id}"),
            sale_id: "s-1".to_string(),
            product_id: id.to_string(),
            sku_snapshot: format!("SKU-{id}"),
            name_snapshot: name.to_string(),
            quantity: qty,
            unit_price_kobo: price,
            subtotal_kobo: qty * price,
        };
        SaleDetail {
            sale: Sale {
                id: "s-1".to_string(),
                receipt_number: "REC-20261015-0001".to_string(),
                status,
                subtotal_kobo: 250_000,
                tax_kobo: 18_750,
                tax_rate_bps: 750,
                discount_kobo: 0,
                total_kobo: 268_750,
                amount_paid_kobo: 300_000,
                change_kobo: 31_250,
                payment_method: PaymentMethod::Cash,
                customer_id: None,
                user_id: "u-1".to_string(),
                created_at,
                voided_at: None,
                void_reason: None,
                voided_by: None,
            },
            items: vec![
                item("A", "Golden Penny Semovita 10kg Bag", 2, 100_000),
                item("B", "Peak Milk", 1, 50_000),
            ],
        }
    }

    fn cashier() -> User {
        User {
            id: "u-1".to_string(),
            username: "ada".to_string(),
            full_name: "Ada Obi".to_string(),
            email: None,
            password_hash: String::new(),
            role: Role::Cashier,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    fn wat() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    #[test]
    fn test_build_copies_sale_figures() {
        let receipt = Receipt::build(
            &detail(SaleStatus::Completed),
            &cashier(),
            None,
            &StoreSettings::default(),
            wat(),
        );
        assert_eq!(receipt.lines.len(), 2);
        assert_eq!(receipt.change_kobo, 31_250);
        assert_eq!(receipt.cashier_username, "ada");
        assert_eq!(receipt.local_time, "15/10/2026 14:03:11");
    }

    #[test]
    fn test_render_text_layout() {
        let text = Receipt::build(
            &detail(SaleStatus::Completed),
            &cashier(),
            None,
            &StoreSettings::default(),
            wat(),
        )
        .render_text();

        assert!(text.contains("Receipt: REC-20261015-0001"));
        assert!(text.contains("Golden Penny Semovit "));
        assert!(text.contains("VAT (7.5%):"));
        assert!(text.contains("₦2,687.50"));
        assert!(text.contains("Payment: CASH"));
        assert!(!text.contains("VOIDED"));
        for line in text.lines() {
            assert!(line.chars().count() <= RECEIPT_WIDTH, "too wide: {line:?}");
        }
    }

    #[test]
    fn test_voided_receipt_is_marked() {
        let text = Receipt::build(
            &detail(SaleStatus::Voided),
            &cashier(),
            None,
            &StoreSettings::default(),
            wat(),
        )
        .render_text();
        assert!(text.contains("*** VOIDED ***"));
    }
}
