//! # Cart Routes
//!
//! The cart belongs to the caller's session; there is no cart id in the
//! path. Every response is the full cart with a VAT preview at the current
//! store rate.
//!
//! ```text
//! GET    /api/cart                       view
//! DELETE /api/cart                       clear
//! POST   /api/cart/items                 add (merge)  { product_id | code, quantity }
//! PUT    /api/cart/items/{product_id}    set quantity { quantity }  (0 removes)
//! DELETE /api/cart/items/{product_id}    remove line
//! ```
//!
//! Stock is checked against the product as it is now; the sale itself
//! re-checks atomically at checkout.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use naira_core::cart::CartView;
use naira_core::{Cart, Product};

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    /// Product id from a catalog search
    #[serde(default)]
    pub product_id: Option<String>,
    /// Scanned barcode or typed SKU
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

async fn view(state: &AppState, cart: &Cart) -> ApiResult<Json<CartView>> {
    let settings = state.db.settings().get().await?;
    Ok(Json(CartView::new(cart, settings.tax_rate())?))
}

pub async fn get(State(state): State<AppState>, current: CurrentUser) -> ApiResult<Json<CartView>> {
    let cart = state.sessions.cart(&current.session_id)?;
    view(&state, &cart).await
}

pub async fn clear(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<CartView>> {
    let cart = state.sessions.with_cart_mut(&current.session_id, |cart| {
        cart.clear();
        cart.clone()
    })?;
    debug!(username = %current.user.username, "Cart cleared");
    view(&state, &cart).await
}

pub async fn add_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<AddItemRequest>,
) -> ApiResult<Json<CartView>> {
    let product: Product = match (req.product_id.as_deref(), req.code.as_deref()) {
        (Some(id), _) => state.db.products().get(id).await?,
        (None, Some(code)) => state.db.products().lookup(code).await?,
        (None, None) => return Err(ApiError::validation("product_id or code is required")),
    };

    let cart = state.sessions.with_cart_mut(&current.session_id, |cart| {
        cart.add(&product, req.quantity).map(|_| cart.clone())
    })??;

    debug!(sku = %product.sku, quantity = req.quantity, lines = cart.line_count(), "Added to cart");
    view(&state, &cart).await
}

pub async fn set_quantity(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(product_id): Path<String>,
    Json(req): Json<SetQuantityRequest>,
) -> ApiResult<Json<CartView>> {
    let product = state.db.products().get(&product_id).await?;

    let cart = state.sessions.with_cart_mut(&current.session_id, |cart| {
        cart.set_quantity(&product, req.quantity).map(|_| cart.clone())
    })??;

    view(&state, &cart).await
}

pub async fn remove_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(product_id): Path<String>,
) -> ApiResult<Json<CartView>> {
    let (removed, cart) = state.sessions.with_cart_mut(&current.session_id, |cart| {
        (cart.remove(&product_id), cart.clone())
    })?;

    if !removed {
        return Err(ApiError::not_found(format!("Product {product_id} is not in the cart")));
    }
    view(&state, &cart).await
}
