//! # Catalog Routes
//!
//! ```text
//! GET    /api/products?q=&include_inactive=&limit=   ViewCatalog
//! GET    /api/products/categories                    ViewCatalog
//! GET    /api/products/lookup?code=                  ViewCatalog   (scanner)
//! GET    /api/products/{id}                          ViewCatalog
//! POST   /api/products                               ManageProducts
//! PUT    /api/products/{id}                          ManageProducts
//! DELETE /api/products/{id}?hard=                    ManageProducts
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;
use naira_core::validation::validate_search_query;
use naira_core::{NewProduct, Product, ProductUpdate};
use naira_db::repository::clamp_limit;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub code: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    /// Remove the row instead of deactivating it. Refused once sold.
    #[serde(default)]
    pub hard: bool,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Product>>> {
    let query = validate_search_query(params.q.as_deref().unwrap_or_default())?;
    let products = state
        .db
        .products()
        .search(&query, params.include_inactive, clamp_limit(params.limit))
        .await?;
    Ok(Json(products))
}

pub async fn categories(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.db.products().categories().await?))
}

/// Barcode scan or typed SKU.
pub async fn lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.db.products().lookup(&params.code).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Product>> {
    Ok(Json(state.db.products().get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state
        .db
        .products()
        .create(&input, Some(&current.user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ProductUpdate>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.db.products().update(&id, update).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<StatusCode> {
    if params.hard {
        state.db.products().hard_delete(&id).await?;
    } else {
        state.db.products().soft_delete(&id).await?;
    }
    info!(product_id = %id, hard = params.hard, by = %current.user.username, "Product removed");
    Ok(StatusCode::NO_CONTENT)
}

