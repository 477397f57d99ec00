//! # Route Table
//!
//! Each group names the one capability it needs. The capability gate runs
//! inside `require_auth`, so an anonymous call gets 401 before any 403.
//!
//! ```text
//! ┌──────────────────────────────────────────────┬──────────────────┐
//! │ Group                                        │ Capability       │
//! ├──────────────────────────────────────────────┼──────────────────┤
//! │ /health, POST /api/auth/login                │ (public)         │
//! │ /api/auth/logout, /api/auth/me               │ (any logged in)  │
//! │ /api/dashboard, GET /api/settings            │ ViewDashboard    │
//! │ GET /api/products...                         │ ViewCatalog      │
//! │ POST/PUT/DELETE /api/products...             │ ManageProducts   │
//! │ /api/cart..., /api/checkout                  │ OperatePos       │
//! │ GET /api/sales...                            │ ViewSales        │
//! │ POST /api/sales/{id}/void                    │ VoidSales        │
//! │ /api/inventory/...                           │ ManageInventory  │
//! │ /api/customers...                            │ ManageCustomers  │
//! │ /api/users...                                │ ManageUsers      │
//! │ PUT /api/settings                            │ ManageSettings   │
//! └──────────────────────────────────────────────┴──────────────────┘
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod customers;
pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod products;
pub mod sales;
pub mod settings;
pub mod users;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::routing::{get, post, put};
use axum::Router;

use crate::auth::{require_auth, require_capability};
use crate::state::AppState;
use naira_core::Capability;

/// Wraps every route of `router` in a capability check.
fn gated(capability: Capability, router: Router<AppState>) -> Router<AppState> {
    router.route_layer(middleware::from_fn(move |request: Request, next: Next| {
        require_capability(capability, request, next)
    }))
}

/// Every route, unauthenticated ones included. State is attached by the
/// caller.
pub fn routes(state: &AppState) -> Router<AppState> {
    let session = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me));

    let dashboard = gated(
        Capability::ViewDashboard,
        Router::new()
            .route("/api/dashboard", get(dashboard::dashboard))
            .route("/api/settings", get(settings::get)),
    );

    let catalog = gated(
        Capability::ViewCatalog,
        Router::new()
            .route("/api/products", get(products::search))
            .route("/api/products/categories", get(products::categories))
            .route("/api/products/lookup", get(products::lookup))
            .route("/api/products/{id}", get(products::get)),
    );

    let catalog_admin = gated(
        Capability::ManageProducts,
        Router::new()
            .route("/api/products", post(products::create))
            .route(
                "/api/products/{id}",
                put(products::update).delete(products::delete),
            ),
    );

    let pos = gated(
        Capability::OperatePos,
        Router::new()
            .route("/api/cart", get(cart::get).delete(cart::clear))
            .route("/api/cart/items", post(cart::add_item))
            .route(
                "/api/cart/items/{product_id}",
                put(cart::set_quantity).delete(cart::remove_item),
            )
            .route("/api/checkout", post(checkout::checkout)),
    );

    let sales_read = gated(
        Capability::ViewSales,
        Router::new()
            .route("/api/sales", get(sales::list))
            .route("/api/sales/summary", get(sales::summary))
            .route("/api/sales/top-products", get(sales::top_products))
            .route("/api/sales/{id}", get(sales::get))
            .route("/api/sales/{id}/receipt", get(sales::receipt))
            .route(
                "/api/sales/receipt/{receipt_number}",
                get(sales::receipt_by_number),
            ),
    );

    let sales_void = gated(
        Capability::VoidSales,
        Router::new().route("/api/sales/{id}/void", post(sales::void)),
    );

    let stock = gated(
        Capability::ManageInventory,
        Router::new()
            .route("/api/inventory/report", get(inventory::report))
            .route("/api/inventory/low-stock", get(inventory::low_stock))
            .route("/api/inventory/movements", get(inventory::movements))
            .route("/api/inventory/adjustments", post(inventory::adjust)),
    );

    let customers = gated(
        Capability::ManageCustomers,
        Router::new()
            .route("/api/customers", get(customers::list).post(customers::create))
            .route("/api/customers/{id}", get(customers::get)),
    );

    let staff = gated(
        Capability::ManageUsers,
        Router::new()
            .route("/api/users", get(users::list).post(users::create))
            .route("/api/users/{id}/active", put(users::set_active)),
    );

    let store_admin = gated(
        Capability::ManageSettings,
        Router::new().route("/api/settings", put(settings::update)),
    );

    let protected = Router::new()
        .merge(session)
        .merge(dashboard)
        .merge(catalog)
        .merge(catalog_admin)
        .merge(pos)
        .merge(sales_read)
        .merge(sales_void)
        .merge(stock)
        .merge(customers)
        .merge(staff)
        .merge(store_admin)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/auth/login", post(auth::login))
        .merge(protected)
}

