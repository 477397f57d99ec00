//! # Sales Routes
//!
//! ```text
//! GET  /api/sales?status=&from=&to=&limit=&offset=     ViewSales
//! GET  /api/sales/summary?day=YYYY-MM-DD                ViewSales
//! GET  /api/sales/top-products?days=&limit=             ViewSales
//! GET  /api/sales/{id}                                  ViewSales
//! GET  /api/sales/{id}/receipt?format=json|text         ViewSales
//! GET  /api/sales/receipt/{receipt_number}?format=      ViewSales
//! POST /api/sales/{id}/void { reason }                  VoidSales
//! ```

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use naira_core::checkout::{business_day, day_bounds};
use naira_core::settings::StoreSettings;
use naira_core::{
    PaymentMethod, Receipt, Sale, SaleDetail, SaleStatus, SalesSummary, TopProduct,
};
use naira_db::SaleQuery;

const DEFAULT_TOP_DAYS: i64 = 30;
const DEFAULT_TOP_LIMIT: i64 = 10;

// =============================================================================
// Receipt
// =============================================================================

/// Receipt view model for a stored sale: cashier, customer and the given
/// settings snapshot for the header and footer.
async fn build_receipt(
    state: &AppState,
    detail: &SaleDetail,
    settings: &StoreSettings,
) -> ApiResult<Receipt> {
    let cashier = state.db.users().get(&detail.sale.user_id).await?;
    let customer = match &detail.sale.customer_id {
        Some(id) => state.db.customers().get_by_id(id).await?,
        None => None,
    };

    Ok(Receipt::build(
        detail,
        &cashier,
        customer.as_ref(),
        settings,
        state.utc_offset,
    ))
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptFormat {
    #[default]
    Json,
    /// 48-column thermal printer text
    Text,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReceiptParams {
    #[serde(default)]
    pub format: ReceiptFormat,
}

async fn render_receipt(
    state: &AppState,
    detail: Option<SaleDetail>,
    missing: &str,
    format: ReceiptFormat,
) -> ApiResult<Response> {
    let detail = detail.ok_or_else(|| ApiError::not_found(format!("Sale not found: {missing}")))?;
    let settings = state.db.settings().get().await?;
    let receipt = build_receipt(state, &detail, &settings).await?;

    Ok(match format {
        ReceiptFormat::Json => Json(receipt).into_response(),
        ReceiptFormat::Text => (
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            receipt.render_text(),
        )
            .into_response(),
    })
}

pub async fn receipt(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ReceiptParams>,
) -> ApiResult<Response> {
    let detail = state.db.sales().get(&id).await?;
    render_receipt(&state, detail, &id, params.format).await
}

/// Reprint by the number printed on the slip.
pub async fn receipt_by_number(
    State(state): State<AppState>,
    Path(receipt_number): Path<String>,
    Query(params): Query<ReceiptParams>,
) -> ApiResult<Response> {
    let detail = state.db.sales().get_by_receipt(&receipt_number).await?;
    render_receipt(&state, detail, &receipt_number, params.format).await
}

// =============================================================================
// Reads
// =============================================================================

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SaleQuery>,
) -> ApiResult<Json<Vec<Sale>>> {
    Ok(Json(state.db.sales().list(&query).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<SaleDetail>> {
    state
        .db
        .sales()
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Sale not found: {id}")))
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    /// Store-local day; today if absent
    #[serde(default)]
    pub day: Option<NaiveDate>,
}

/// Takings for one payment method on the day, for the cash-up.
#[derive(Debug, Serialize)]
pub struct PaymentBreakdown {
    pub payment_method: PaymentMethod,
    pub transactions: i64,
    pub total_kobo: i64,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub business_day: NaiveDate,
    #[serde(flatten)]
    pub summary: SalesSummary,
    pub by_payment_method: Vec<PaymentBreakdown>,
}

/// All-time totals plus the given day's takings split by tender.
pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> ApiResult<Json<SummaryResponse>> {
    let day = params
        .day
        .unwrap_or_else(|| business_day(Utc::now(), state.utc_offset));
    let (start, end) = day_bounds(day, state.utc_offset)?;

    let summary = state.db.sales().summary(start, end).await?;
    let day_sales = state.db.sales().list_between(start, end).await?;

    Ok(Json(SummaryResponse {
        business_day: day,
        summary,
        by_payment_method: breakdown(&day_sales),
    }))
}

fn breakdown(sales: &[Sale]) -> Vec<PaymentBreakdown> {
    let mut totals: BTreeMap<&'static str, PaymentBreakdown> = BTreeMap::new();
    for sale in sales.iter().filter(|s| s.status == SaleStatus::Completed) {
        let entry = totals
            .entry(sale.payment_method.label())
            .or_insert(PaymentBreakdown {
                payment_method: sale.payment_method,
                transactions: 0,
                total_kobo: 0,
            });
        entry.transactions += 1;
        entry.total_kobo += sale.total_kobo;
    }
    totals.into_values().collect()
}

#[derive(Debug, Default, Deserialize)]
pub struct TopParams {
    #[serde(default)]
    pub days: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

pub async fn top_products(
    State(state): State<AppState>,
    Query(params): Query<TopParams>,
) -> ApiResult<Json<Vec<TopProduct>>> {
    let days = params.days.unwrap_or(DEFAULT_TOP_DAYS).clamp(1, 3650);
    let limit = params.limit.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, 100);
    let since = Utc::now() - Duration::days(days);

    Ok(Json(state.db.sales().top_products(since, limit).await?))
}

// =============================================================================
// Void
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct VoidRequest {
    pub reason: String,
}

/// Voids a completed sale and puts its stock back. Voiding an already
/// voided sale returns it unchanged.
pub async fn void(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<VoidRequest>,
) -> ApiResult<Json<SaleDetail>> {
    let detail = state
        .db
        .sales()
        .void(&id, &req.reason, &current.user.id)
        .await?;

    info!(
        receipt = %detail.sale.receipt_number,
        by = %current.user.username,
        "Void requested"
    );
    Ok(Json(detail))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(method: PaymentMethod, status: SaleStatus, total_kobo: i64) -> Sale {
        Sale {
            id: "s".to_string(),
            receipt_number: "REC-20261015-0001".to_string(),
            status,
            subtotal_kobo: total_kobo,
            tax_kobo: 0,
            tax_rate_bps: 0,
            discount_kobo: 0,
            total_kobo,
            amount_paid_kobo: total_kobo,
            change_kobo: 0,
            payment_method: method,
            customer_id: None,
            user_id: "u".to_string(),
            created_at: Utc::now(),
            voided_at: None,
            void_reason: None,
            voided_by: None,
        }
    }

    #[test]
    fn test_breakdown_skips_voided() {
        let sales = vec![
            sale(PaymentMethod::Cash, SaleStatus::Completed, 100_000),
            sale(PaymentMethod::Cash, SaleStatus::Completed, 50_000),
            sale(PaymentMethod::Transfer, SaleStatus::Completed, 250_000),
            sale(PaymentMethod::Pos, SaleStatus::Voided, 75_000),
        ];

        let rows = breakdown(&sales);
        assert_eq!(rows.len(), 2);

        let cash = rows
            .iter()
            .find(|r| r.payment_method == PaymentMethod::Cash)
            .unwrap();
        assert_eq!(cash.transactions, 2);
        assert_eq!(cash.total_kobo, 150_000);
    }
}
