//! Customer records attached to sales.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;
use naira_core::validation::validate_search_query;
use naira_core::{Customer, NewCustomer};
use naira_db::repository::clamp_limit;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Matches name, phone or email
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Customer>>> {
    let limit = clamp_limit(params.limit);
    let query = validate_search_query(params.q.as_deref().unwrap_or_default())?;

    let customers = if query.is_empty() {
        state
            .db
            .customers()
            .list(limit, params.offset.unwrap_or(0))
            .await?
    } else {
        state.db.customers().search(&query, limit).await?
    };
    Ok(Json(customers))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewCustomer>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let customer = state.db.customers().create(&input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Customer>> {
    Ok(Json(state.db.customers().get(&id).await?))
}
