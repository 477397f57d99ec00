//! # Settings Repository
//!
//! The single `store_settings` row (id = 1). Seeded from configuration on
//! first start; afterwards the stored row wins.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use naira_core::StoreSettings;

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Writes `defaults` only if no settings row exists, then returns the
    /// stored row.
    pub async fn ensure(&self, defaults: &StoreSettings) -> DbResult<StoreSettings> {
        defaults.validate()?;

        let inserted = sqlx::query(
            r#"
            INSERT OR IGNORE INTO store_settings (
                id, store_name, address, phone, email, tax_id, currency_symbol,
                tax_rate_bps, receipt_footer, updated_at
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&defaults.store_name)
        .bind(&defaults.address)
        .bind(&defaults.phone)
        .bind(&defaults.email)
        .bind(&defaults.tax_id)
        .bind(&defaults.currency_symbol)
        .bind(defaults.tax_rate_bps)
        .bind(&defaults.receipt_footer)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() > 0 {
            info!(store = %defaults.store_name, "Store settings seeded");
        }

        self.get().await
    }

    pub async fn get(&self) -> DbResult<StoreSettings> {
        sqlx::query_as::<_, StoreSettings>(
            r#"
            SELECT store_name, address, phone, email, tax_id, currency_symbol,
                   tax_rate_bps, receipt_footer
            FROM store_settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("StoreSettings", "1"))
    }

    /// Replaces the stored settings. Sales already made keep the VAT rate
    /// they were priced at.
    pub async fn save(&self, settings: &StoreSettings) -> DbResult<StoreSettings> {
        settings.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE store_settings SET
                store_name = ?1, address = ?2, phone = ?3, email = ?4, tax_id = ?5,
                currency_symbol = ?6, tax_rate_bps = ?7, receipt_footer = ?8, updated_at = ?9
            WHERE id = 1
            "#,
        )
        .bind(&settings.store_name)
        .bind(&settings.address)
        .bind(&settings.phone)
        .bind(&settings.email)
        .bind(&settings.tax_id)
        .bind(&settings.currency_symbol)
        .bind(settings.tax_rate_bps)
        .bind(&settings.receipt_footer)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return self.ensure(settings).await;
        }

        info!(tax_rate_bps = settings.tax_rate_bps, "Store settings updated");
        self.get().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;
    use naira_core::settings::SettingsUpdate;

    #[tokio::test]
    async fn test_ensure_seeds_once() {
        let db = test_db().await;
        let repo = db.settings();

        assert!(repo.get().await.is_err());

        let seeded = repo.ensure(&StoreSettings::default()).await.unwrap();
        assert_eq!(seeded.tax_rate_bps, 750);

        let other = StoreSettings {
            store_name: "Ignored".to_string(),
            ..StoreSettings::default()
        };
        assert_eq!(repo.ensure(&other).await.unwrap().store_name, seeded.store_name);
    }

    #[tokio::test]
    async fn test_save_updates_row() {
        let db = test_db().await;
        let repo = db.settings();
        let current = repo.ensure(&StoreSettings::default()).await.unwrap();

        let next = SettingsUpdate {
            tax_rate_bps: Some(500),
            receipt_footer: Some("No refund after payment".to_string()),
            ..Default::default()
        }
        .apply(&current)
        .unwrap();

        let saved = repo.save(&next).await.unwrap();
        assert_eq!(saved.tax_rate_bps, 500);
        assert_eq!(repo.get().await.unwrap().receipt_footer, "No refund after payment");
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_rate() {
        let db = test_db().await;
        let bad = StoreSettings {
            tax_rate_bps: 20_000,
            ..StoreSettings::default()
        };
        assert!(db.settings().save(&bad).await.is_err());
    }
}
