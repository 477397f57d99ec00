//! # Store Settings
//!
//! Company header, VAT rate and receipt footer. Loaded per request and passed
//! into checkout by value, so a settings change never races an in-flight sale.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::NAIRA_SYMBOL;
use crate::types::TaxRate;
use crate::validation::{validate_tax_rate_bps, ValidationResult};
use crate::DEFAULT_VAT_BPS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StoreSettings {
    pub store_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    /// TIN printed on receipts.
    pub tax_id: String,
    pub currency_symbol: String,
    pub tax_rate_bps: u32,
    pub receipt_footer: String,
}

impl StoreSettings {
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if self.store_name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "store_name".to_string(),
            });
        }
        if self.currency_symbol.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "currency_symbol".to_string(),
            });
        }
        validate_tax_rate_bps(self.tax_rate_bps)
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            store_name: "Naira POS Store".to_string(),
            address: "Lagos, Nigeria".to_string(),
            phone: String::new(),
            email: String::new(),
            tax_id: String::new(),
            currency_symbol: NAIRA_SYMBOL.to_string(),
            tax_rate_bps: DEFAULT_VAT_BPS,
            receipt_footer: "Thank you for your patronage!".to_string(),
        }
    }
}

/// Partial update of [`StoreSettings`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    #[serde(default)]
    pub tax_rate_bps: Option<u32>,
    #[serde(default)]
    pub receipt_footer: Option<String>,
}

impl SettingsUpdate {
    /// Applies the update to a copy of `current` and validates the result.
    pub fn apply(self, current: &StoreSettings) -> ValidationResult<StoreSettings> {
        let merged = StoreSettings {
            store_name: self.store_name.unwrap_or_else(|| current.store_name.clone()),
            address: self.address.unwrap_or_else(|| current.address.clone()),
            phone: self.phone.unwrap_or_else(|| current.phone.clone()),
            email: self.email.unwrap_or_else(|| current.email.clone()),
            tax_id: self.tax_id.unwrap_or_else(|| current.tax_id.clone()),
            currency_symbol: self
                .currency_symbol
                .unwrap_or_else(|| current.currency_symbol.clone()),
            tax_rate_bps: self.tax_rate_bps.unwrap_or(current.tax_rate_bps),
            receipt_footer: self
                .receipt_footer
                .unwrap_or_else(|| current.receipt_footer.clone()),
        };
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_nigerian_vat() {
        let settings = StoreSettings::default();
        assert_eq!(settings.tax_rate().bps(), 750);
        assert_eq!(settings.currency_symbol, "₦");
    }

    #[test]
    fn test_update_merges_and_validates() {
        let current = StoreSettings::default();
        let updated = SettingsUpdate {
            store_name: Some("Mama Put Supermarket".to_string()),
            ..Default::default()
        }
        .apply(&current)
        .unwrap();
        assert_eq!(updated.store_name, "Mama Put Supermarket");
        assert_eq!(updated.tax_rate_bps, 750);

        let rejected = SettingsUpdate {
            tax_rate_bps: Some(20_000),
            ..Default::default()
        }
        .apply(&current);
        assert!(rejected.is_err());
    }
}
