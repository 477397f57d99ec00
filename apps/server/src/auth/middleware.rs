//! Request guards for authenticated route groups.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use super::jwt::extract_bearer_token;
use crate::error::ApiError;
use crate::state::AppState;
use naira_core::{Capability, User};

/// Authenticated staff member, inserted by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session_id: String,
    pub capabilities: Vec<Capability>,
}

impl CurrentUser {
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))
    }
}

/// Verifies the bearer token and its session.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let token = extract_bearer_token(auth_header)
        .ok_or_else(|| ApiError::unauthorized("Invalid Authorization format"))?;

    let claims = state.jwt.validate(token)?;

    let user = state
        .sessions
        .touch(&claims.sid)
        .map_err(|_| ApiError::unauthorized("Session expired, please log in again"))?;

    if user.id != claims.sub {
        tracing::warn!(sid = %claims.sid, sub = %claims.sub, "Token subject does not match session");
        return Err(ApiError::unauthorized("Invalid session"));
    }

    let capabilities = state.permissions.capabilities(user.role);
    request.extensions_mut().insert(CurrentUser {
        user,
        session_id: claims.sid,
        capabilities,
    });

    Ok(next.run(request).await)
}

/// Refuses the request unless the current user's role grants `capability`.
///
/// ## Usage
/// ```rust,ignore
/// router.route_layer(middleware::from_fn(move |req: Request, next: Next| {
///     require_capability(Capability::ManageInventory, req, next)
/// }))
/// ```
pub async fn require_capability(
    capability: Capability,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let current = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    if !current.can(capability) {
        tracing::info!(
            username = %current.user.username,
            role = %current.user.role,
            ?capability,
            "Access denied"
        );
        return Err(ApiError::forbidden(format!(
            "Your role ({}) does not allow this action",
            current.user.role
        )));
    }

    Ok(next.run(request).await)
}
