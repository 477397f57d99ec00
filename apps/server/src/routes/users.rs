//! Staff accounts (admin only).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::auth::{hash_password, CurrentUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use naira_core::validation::validate_password;
use naira_core::{NewUser, User};

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.db.users().list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    validate_password(&input.password)?;

    let password = input.password.clone();
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(ApiError::internal)??;

    let user = state.db.users().create(&input, &hash).await?;
    info!(username = %user.username, role = %user.role, by = %current.user.username, "Staff account created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Deactivating a user also ends their open sessions.
pub async fn set_active(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<SetActiveRequest>,
) -> ApiResult<Json<User>> {
    let user = state.db.users().set_active(&id, req.active).await?;

    if !user.is_active {
        let ended = state.sessions.remove_user(&user.id);
        info!(username = %user.username, sessions_ended = ended, by = %current.user.username, "User deactivated");
    }
    Ok(Json(user))
}
