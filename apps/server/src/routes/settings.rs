//! Store settings: header, footer and the VAT rate used by new sales.

use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;
use naira_core::settings::SettingsUpdate;
use naira_core::StoreSettings;

pub async fn get(State(state): State<AppState>) -> ApiResult<Json<StoreSettings>> {
    Ok(Json(state.db.settings().get().await?))
}

/// Partial update. Completed sales keep the rate they were priced at.
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<Json<StoreSettings>> {
    let current_settings = state.db.settings().get().await?;
    let next = update.apply(&current_settings)?;
    let saved = state.db.settings().save(&next).await?;

    info!(by = %current.user.username, tax_rate_bps = saved.tax_rate_bps, "Store settings changed");
    Ok(Json(saved))
}
