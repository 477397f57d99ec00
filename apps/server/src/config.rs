//! Server configuration.
//!
//! Configuration is loaded from `NAIRA_*` environment variables with
//! fallback to defaults. `main` loads `.env` first via dotenvy.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use chrono::FixedOffset;
use naira_core::{StoreSettings, DEFAULT_VAT_BPS};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: SocketAddr,

    /// SQLite database file
    pub db_path: String,

    pub db_max_connections: u32,

    /// HS256 key for session tokens
    pub jwt_secret: String,

    /// A session (and its cart) expires after this much inactivity
    pub session_idle_minutes: i64,

    /// Store offset from UTC in minutes (WAT = +60)
    pub utc_offset_minutes: i32,

    pub store_name: String,
    pub store_address: String,
    pub store_phone: String,
    pub store_email: String,
    pub tax_id: String,

    /// VAT in basis points; 750 = 7.5%
    pub tax_rate_bps: u32,

    pub receipt_footer: String,

    /// Password for the `admin` account created when no users exist
    pub bootstrap_admin_password: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = StoreSettings::default();

        let config = ServerConfig {
            bind_addr: parse_var("NAIRA_BIND_ADDR", "0.0.0.0:8080")?,

            db_path: env::var("NAIRA_DB_PATH").unwrap_or_else(|_| "./naira_pos.db".to_string()),

            db_max_connections: parse_var("NAIRA_DB_MAX_CONNECTIONS", "5")?,

            jwt_secret: env::var("NAIRA_JWT_SECRET").unwrap_or_else(|_| {
                // Development only; production must set NAIRA_JWT_SECRET
                "naira-pos-dev-secret-change-in-production".to_string()
            }),

            session_idle_minutes: parse_var("NAIRA_SESSION_IDLE_MINUTES", "480")?,

            utc_offset_minutes: parse_var("NAIRA_UTC_OFFSET_MINUTES", "60")?,

            store_name: env::var("NAIRA_STORE_NAME").unwrap_or(defaults.store_name),
            store_address: env::var("NAIRA_STORE_ADDRESS").unwrap_or(defaults.address),
            store_phone: env::var("NAIRA_STORE_PHONE").unwrap_or(defaults.phone),
            store_email: env::var("NAIRA_STORE_EMAIL").unwrap_or(defaults.email),
            tax_id: env::var("NAIRA_TAX_ID").unwrap_or(defaults.tax_id),

            tax_rate_bps: parse_var("NAIRA_TAX_RATE_BPS", &DEFAULT_VAT_BPS.to_string())?,

            receipt_footer: env::var("NAIRA_RECEIPT_FOOTER").unwrap_or(defaults.receipt_footer),

            bootstrap_admin_password: env::var("NAIRA_BOOTSTRAP_ADMIN_PASSWORD")
                .ok()
                .filter(|p| !p.is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < 16 {
            return Err(ConfigError::InvalidValue("NAIRA_JWT_SECRET".to_string()));
        }
        if self.session_idle_minutes <= 0 {
            return Err(ConfigError::InvalidValue(
                "NAIRA_SESSION_IDLE_MINUTES".to_string(),
            ));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "NAIRA_DB_MAX_CONNECTIONS".to_string(),
            ));
        }
        self.utc_offset()?;
        self.store_defaults()
            .validate()
            .map_err(|e| ConfigError::InvalidStoreSettings(e.to_string()))?;
        Ok(())
    }

    /// Store UTC offset, used for business days and receipt times.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .ok_or_else(|| ConfigError::InvalidValue("NAIRA_UTC_OFFSET_MINUTES".to_string()))
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_minutes.unsigned_abs() * 60)
    }

    /// Settings written to the database on first start only.
    pub fn store_defaults(&self) -> StoreSettings {
        StoreSettings {
            store_name: self.store_name.clone(),
            address: self.store_address.clone(),
            phone: self.store_phone.clone(),
            email: self.store_email.clone(),
            tax_id: self.tax_id.clone(),
            tax_rate_bps: self.tax_rate_bps,
            receipt_footer: self.receipt_footer.clone(),
            ..StoreSettings::default()
        }
    }

    /// Configuration for tests: in-memory friendly defaults, no environment.
    pub fn for_tests() -> Self {
        let defaults = StoreSettings::default();
        ServerConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            db_path: ":memory:".to_string(),
            db_max_connections: 1,
            jwt_secret: "naira-pos-test-secret-0123456789".to_string(),
            session_idle_minutes: 30,
            utc_offset_minutes: 60,
            store_name: defaults.store_name,
            store_address: defaults.address,
            store_phone: defaults.phone,
            store_email: defaults.email,
            tax_id: defaults.tax_id,
            tax_rate_bps: defaults.tax_rate_bps,
            receipt_footer: defaults.receipt_footer,
            bootstrap_admin_password: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T, ConfigError> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid store settings: {0}")]
    InvalidStoreSettings(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_config_is_valid() {
        let config = ServerConfig::for_tests();
        assert!(config.validate().is_ok());
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), 3600);
        assert_eq!(config.session_idle_timeout(), Duration::from_secs(1800));
    }

    #[test]
    fn test_out_of_range_offset_rejected() {
        let config = ServerConfig {
            utc_offset_minutes: 24 * 60,
            ..ServerConfig::for_tests()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_store_defaults_carry_tax_rate() {
        let config = ServerConfig {
            tax_rate_bps: 500,
            ..ServerConfig::for_tests()
        };
        assert_eq!(config.store_defaults().tax_rate_bps, 500);
        assert_eq!(config.store_defaults().currency_symbol, "₦");
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = ServerConfig {
            jwt_secret: "short".to_string(),
            ..ServerConfig::for_tests()
        };
        assert!(config.validate().is_err());
    }
}
