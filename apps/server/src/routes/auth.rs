//! Login, logout and the current user.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{verify_password, CurrentUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use naira_core::{Capability, User};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    pub capabilities: Vec<Capability>,
    /// Idle seconds before the session and its cart are dropped
    pub session_idle_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub capabilities: Vec<Capability>,
}

/// Verifies credentials, opens a session with an empty cart, and issues a
/// token bound to it.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let rejected = || ApiError::unauthorized("Invalid username or password");

    let user = state
        .db
        .users()
        .get_by_username(&req.username)
        .await?
        .ok_or_else(rejected)?;

    // argon2 verification blocks for tens of milliseconds
    let hash = user.password_hash.clone();
    let password = req.password;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(ApiError::internal)?;

    if !verified {
        warn!(username = %user.username, "Failed login");
        return Err(rejected());
    }
    if !user.is_active {
        warn!(username = %user.username, "Login by deactivated user");
        return Err(rejected());
    }

    state.db.users().record_login(&user.id).await?;
    let user = state.db.users().get(&user.id).await?;

    let sid = state.sessions.create(user.clone());
    let token = state.jwt.issue(&user, &sid)?;

    info!(username = %user.username, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        capabilities: state.permissions.capabilities(user.role),
        user,
        session_idle_secs: state.sessions.idle_timeout().as_secs(),
    }))
}

/// Destroys the session and its cart.
pub async fn logout(State(state): State<AppState>, current: CurrentUser) -> StatusCode {
    state.sessions.remove(&current.session_id);
    info!(username = %current.user.username, "User logged out");
    StatusCode::NO_CONTENT
}

pub async fn me(current: CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: current.user,
        capabilities: current.capabilities,
    })
}
