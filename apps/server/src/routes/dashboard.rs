//! Dashboard: today's takings, stock health and the latest sales.

use axum::extract::State;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;
use naira_core::checkout::{business_day, day_bounds};
use naira_core::{Sale, SalesSummary};
use naira_db::SaleQuery;

const RECENT_SALES: i64 = 10;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub business_day: NaiveDate,
    pub summary: SalesSummary,
    /// Active products at or below their reorder level, out of stock included
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    pub inventory_value_kobo: i64,
    pub recent_sales: Vec<Sale>,
}

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardResponse>> {
    let today = business_day(Utc::now(), state.utc_offset);
    let (start, end) = day_bounds(today, state.utc_offset)?;

    let summary = state.db.sales().summary(start, end).await?;
    let inventory = state.db.reports().inventory().await?;
    let recent_sales = state
        .db
        .sales()
        .list(&SaleQuery {
            limit: Some(RECENT_SALES),
            ..SaleQuery::default()
        })
        .await?;

    Ok(Json(DashboardResponse {
        business_day: today,
        summary,
        low_stock_count: inventory.low_stock + inventory.out_of_stock,
        out_of_stock_count: inventory.out_of_stock,
        inventory_value_kobo: inventory.total_value_kobo,
        recent_sales,
    }))
}
