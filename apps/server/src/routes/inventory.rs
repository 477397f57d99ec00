//! Stock report, low-stock list, movement history and manual adjustments.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;
use naira_core::inventory::{InventoryReport, InventoryRow};
use naira_core::{StockAdjustment, StockMovement};
use naira_db::MovementQuery;

pub async fn report(State(state): State<AppState>) -> ApiResult<Json<InventoryReport>> {
    Ok(Json(state.db.reports().inventory().await?))
}

/// OUT and LOW rows, emptiest first.
pub async fn low_stock(State(state): State<AppState>) -> ApiResult<Json<Vec<InventoryRow>>> {
    Ok(Json(state.db.reports().low_stock().await?))
}

pub async fn movements(
    State(state): State<AppState>,
    Query(query): Query<MovementQuery>,
) -> ApiResult<Json<Vec<StockMovement>>> {
    Ok(Json(state.db.stock().movements(&query).await?))
}

/// Purchase, return or correction. Below-zero results are refused.
pub async fn adjust(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(adjustment): Json<StockAdjustment>,
) -> ApiResult<(StatusCode, Json<StockMovement>)> {
    let movement = state
        .db
        .stock()
        .adjust(&adjustment, Some(&current.user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}
