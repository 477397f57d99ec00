//! # Checkout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/checkout { payment_method, amount_paid_kobo,                 │
//! │                       discount_kobo?, customer_id? }                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sessions.begin_checkout(sid)     second concurrent call → 409          │
//! │       │  (cart snapshot + guard)                                        │
//! │       ▼                                                                 │
//! │  settings.get()                   current VAT, passed explicitly        │
//! │  plan_checkout()                  empty cart, discount, tender → 4xx    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sales().checkout(plan)           ONE transaction: receipt no., sale,   │
//! │       │                           items, conditional decrements,        │
//! │       │                           movements. Any failure rolls back.    │
//! │       ▼                                                                 │
//! │  guard.commit()                   cart cleared only now                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  201 Receipt                      always, once committed; a failed      │
//! │                                   customer lookup is logged and the     │
//! │                                   receipt printed without the name      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{FixedOffset, Utc};
use tracing::{error, info, warn};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;
use naira_core::checkout::{business_day, plan_checkout, CheckoutRequest};
use naira_core::{Customer, Receipt, SaleDetail, StoreSettings, User};
use naira_db::DbResult;

pub async fn checkout(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<Receipt>)> {
    let (cart, guard) = state.sessions.begin_checkout(&current.session_id)?;

    let settings = state.db.settings().get().await?;
    let day = business_day(Utc::now(), state.utc_offset);
    let plan = plan_checkout(&cart, &req, &settings, &current.user.id, day)?;

    let detail = match state.db.sales().checkout(&plan).await {
        Ok(detail) => detail,
        Err(e) => {
            warn!(username = %current.user.username, error = %e, "Checkout failed, cart kept");
            return Err(e.into());
        }
    };
    guard.commit();

    info!(
        receipt = %detail.sale.receipt_number,
        total = %detail.sale.total(),
        lines = detail.items.len(),
        payment = detail.sale.payment_method.label(),
        cashier = %current.user.username,
        "Sale completed"
    );

    let customer = match &detail.sale.customer_id {
        Some(id) => state.db.customers().get_by_id(id).await,
        None => Ok(None),
    };
    let receipt = committed_receipt(&detail, &current.user, customer, &settings, state.utc_offset);
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Receipt for a sale that is already committed. Cannot fail: the cashier is
/// the caller and a customer lookup error only drops the name.
fn committed_receipt(
    detail: &SaleDetail,
    cashier: &User,
    customer: DbResult<Option<Customer>>,
    settings: &StoreSettings,
    offset: FixedOffset,
) -> Receipt {
    let customer = customer.unwrap_or_else(|e| {
        error!(
            receipt = %detail.sale.receipt_number,
            customer_id = ?detail.sale.customer_id,
            error = %e,
            "Customer lookup failed after commit, receipt issued without customer"
        );
        None
    });
    Receipt::build(detail, cashier, customer.as_ref(), settings, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use naira_core::{PaymentMethod, Role, Sale, SaleStatus};
    use naira_db::DbError;

    fn detail() -> SaleDetail {
        SaleDetail {
            sale: Sale {
                id: "s-1".to_string(),
                receipt_number: "REC-20261015-0042".to_string(),
                status: SaleStatus::Completed,
                subtotal_kobo: 100_000,
                tax_kobo: 7_500,
                tax_rate_bps: 750,
                discount_kobo: 0,
                total_kobo: 107_500,
                amount_paid_kobo: 110_000,
                change_kobo: 2_500,
                payment_method: PaymentMethod::Cash,
                customer_id: Some("c-1".to_string()),
                user_id: "u-1".to_string(),
                created_at: Utc::now(),
                voided_at: None,
                void_reason: None,
                voided_by: None,
            },
            items: Vec::new(),
        }
    }

    fn cashier() -> User {
        User {
            id: "u-1".to_string(),
            username: "ada".to_string(),
            full_name: "Ada Obi".to_string(),
            email: None,
            password_hash: String::new(),
            role: Role::Cashier,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    fn wat() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    #[test]
    fn test_receipt_survives_customer_lookup_failure() {
        let receipt = committed_receipt(
            &detail(),
            &cashier(),
            Err(DbError::QueryFailed("database is locked".to_string())),
            &StoreSettings::default(),
            wat(),
        );
        assert_eq!(receipt.receipt_number, "REC-20261015-0042");
        assert_eq!(receipt.total_kobo, 107_500);
        assert_eq!(receipt.cashier_username, "ada");
        assert!(receipt.customer_name.is_none());
    }

    #[test]
    fn test_receipt_names_found_customer() {
        let customer = Customer {
            id: "c-1".to_string(),
            name: "Chinedu Okafor".to_string(),
            phone: None,
            email: None,
            created_at: Utc::now(),
        };
        let receipt = committed_receipt(
            &detail(),
            &cashier(),
            Ok(Some(customer)),
            &StoreSettings::default(),
            wat(),
        );
        assert_eq!(receipt.customer_name.as_deref(), Some("Chinedu Okafor"));
    }
}
