//! # Application State
//!
//! Shared by every handler through axum's `State` extractor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           AppState (Clone)                              │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │   Database   │  │ SessionStore │  │ Permission   │  │ JwtManager │  │
//! │  │  (SQLite     │  │  Arc<Mutex<  │  │ Matrix       │  │  HS256     │  │
//! │  │   pool)      │  │   HashMap>>  │  │ (read-only)  │  │            │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │                                                                         │
//! │  Store settings are NOT cached here: handlers read the current row      │
//! │  and pass it explicitly into checkout and receipt rendering.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod session;

use std::sync::Arc;

use chrono::FixedOffset;

use crate::auth::JwtManager;
use crate::config::{ConfigError, ServerConfig};
use naira_core::PermissionMatrix;
use naira_db::Database;

pub use session::{spawn_sweeper, CheckoutGuard, SessionError, SessionStore, StaffSession};

/// Upper bound on a token; the session's idle timeout usually ends it first.
const TOKEN_LIFETIME_SECS: i64 = 12 * 60 * 60;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SessionStore,
    pub permissions: Arc<PermissionMatrix>,
    pub jwt: JwtManager,
    pub config: Arc<ServerConfig>,
    /// Store offset from UTC, resolved once from config.
    pub utc_offset: FixedOffset,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Result<Self, ConfigError> {
        let utc_offset = config.utc_offset()?;
        let idle = config.session_idle_timeout();
        let jwt = JwtManager::new(&config.jwt_secret, TOKEN_LIFETIME_SECS);

        Ok(AppState {
            db,
            sessions: SessionStore::new(idle),
            permissions: Arc::new(PermissionMatrix::standard()),
            jwt,
            config: Arc::new(config),
            utc_offset,
        })
    }
}
