//! # naira-server: JSON API for Naira POS
//!
//! Authenticates staff, keeps one cart per session, and exposes the
//! catalog, till, sales ledger and stock screens over HTTP.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Naira POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              ★ naira-server (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌────────┐ ┌──────────┐ ┌──────────┐ ┌────────┐ ┌────────┐   │   │
//! │  │   │ config │ │   auth   │ │ sessions │ │ routes │ │ error  │   │   │
//! │  │   │  env   │ │ JWT+argon│ │  carts   │ │  axum  │ │  JSON  │   │   │
//! │  │   └────────┘ └──────────┘ └──────────┘ └────────┘ └────────┘   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                naira-core (rules, no I/O)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                naira-db (SQLite, transactions)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

use naira_core::{NewUser, Role};

/// Username of the account created on an empty database.
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";

/// Full application router with request tracing and CORS.
pub fn build_router(state: AppState) -> Router {
    routes::routes(&state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Creates the first admin when there are no staff accounts yet.
///
/// ## Returns
/// * `Ok(true)` - an admin was created
/// * `Ok(false)` - users already exist, nothing done
/// * `Err` - no users and no bootstrap password configured
pub async fn bootstrap_admin(state: &AppState) -> Result<bool, ApiError> {
    if state.db.users().count().await? > 0 {
        return Ok(false);
    }

    let Some(password) = state.config.bootstrap_admin_password.clone() else {
        warn!("No staff accounts and NAIRA_BOOTSTRAP_ADMIN_PASSWORD is not set");
        let missing = ConfigError::MissingRequired("NAIRA_BOOTSTRAP_ADMIN_PASSWORD".to_string());
        return Err(ApiError::new(ErrorCode::InternalError, missing.to_string()));
    };
    naira_core::validation::validate_password(&password)?;

    let input = NewUser {
        username: BOOTSTRAP_ADMIN_USERNAME.to_string(),
        full_name: "Store Administrator".to_string(),
        email: None,
        password,
        role: Role::Admin,
    };
    let hash = auth::hash_password(&input.password)?;
    state.db.users().create(&input, &hash).await?;

    info!(username = BOOTSTRAP_ADMIN_USERNAME, "Bootstrap admin created");
    Ok(true)
}
