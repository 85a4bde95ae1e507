use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::accounts::directory::UserDirectory;
use crate::accounts::router::require_session;
use crate::accounts::session::SessionService;

use super::domain::{PackageId, PaymentMethod};
use super::repository::OrderStore;
use super::service::{BillingError, BillingService};

pub struct BillingRoutes<O, D> {
    pub billing: Arc<BillingService<O, D>>,
    pub sessions: Arc<SessionService<D>>,
}

impl<O, D> Clone for BillingRoutes<O, D> {
    fn clone(&self) -> Self {
        Self {
            billing: Arc::clone(&self.billing),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

/// Router builder exposing the package catalog and order endpoints.
pub fn billing_router<O, D>(
    billing: Arc<BillingService<O, D>>,
    sessions: Arc<SessionService<D>>,
) -> Router
where
    O: OrderStore + 'static,
    D: UserDirectory + 'static,
{
    let state = BillingRoutes { billing, sessions };
    Router::new()
        .route("/api/v1/packages", get(packages_handler::<O, D>))
        .route(
            "/api/v1/orders",
            get(history_handler::<O, D>).post(purchase_handler::<O, D>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct PurchaseRequest {
    pub(crate) package_id: String,
    pub(crate) payment_method: String,
}

pub(crate) async fn packages_handler<O, D>(
    State(state): State<BillingRoutes<O, D>>,
    headers: HeaderMap,
) -> Response
where
    O: OrderStore + 'static,
    D: UserDirectory + 'static,
{
    let user = match require_session(&state.sessions, &headers) {
        Ok(user) => user,
        Err(denied) => return denied,
    };

    let packages = state.billing.packages_for(user.role);
    (StatusCode::OK, Json(packages)).into_response()
}

pub(crate) async fn purchase_handler<O, D>(
    State(state): State<BillingRoutes<O, D>>,
    headers: HeaderMap,
    Json(request): Json<PurchaseRequest>,
) -> Response
where
    O: OrderStore + 'static,
    D: UserDirectory + 'static,
{
    let user = match require_session(&state.sessions, &headers) {
        Ok(user) => user,
        Err(denied) => return denied,
    };

    let Some(method) = PaymentMethod::from_param(&request.payment_method) else {
        let payload = json!({
            "error": format!("unknown payment method '{}'", request.payment_method),
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
    };

    let package_id = PackageId(request.package_id);
    match state.billing.purchase(&user.id, &package_id, method) {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(error) => billing_error_response(error),
    }
}

pub(crate) async fn history_handler<O, D>(
    State(state): State<BillingRoutes<O, D>>,
    headers: HeaderMap,
) -> Response
where
    O: OrderStore + 'static,
    D: UserDirectory + 'static,
{
    let user = match require_session(&state.sessions, &headers) {
        Ok(user) => user,
        Err(denied) => return denied,
    };

    match state.billing.history(&user.id) {
        Ok(orders) => (StatusCode::OK, Json(orders)).into_response(),
        Err(error) => billing_error_response(error),
    }
}

fn billing_error_response(error: BillingError) -> Response {
    let status = match &error {
        BillingError::UnknownBuyer | BillingError::UnknownPackage(_) => StatusCode::NOT_FOUND,
        BillingError::NotAvailableForRole { .. } => StatusCode::FORBIDDEN,
        BillingError::Orders(_) | BillingError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
