use std::sync::Arc;

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Serialize;
use serde_json::json;

use homeshare::accounts::{
    account_router, bearer_token, require_session, SessionService, User, UserDirectory, UserRole,
};
use homeshare::billing::{billing_router, BillingService, Order, OrderStatus, OrderStore};
use homeshare::listings::{listing_router, Listing, ListingRepository, ListingService};
use homeshare::navigation::{AccessLevel, Page};

use crate::infra::AppState;

/// Compose the marketplace routers with the operational endpoints.
pub(crate) fn marketplace_router<R, O, D>(
    listings: Arc<ListingService<R, D>>,
    billing: Arc<BillingService<O, D>>,
    sessions: Arc<SessionService<D>>,
    users: Arc<D>,
    listing_store: Arc<R>,
    orders: Arc<O>,
) -> axum::Router
where
    R: ListingRepository + 'static,
    O: OrderStore + 'static,
    D: UserDirectory + 'static,
{
    let admin = axum::Router::new()
        .route(
            "/api/v1/admin/overview",
            axum::routing::get(admin_overview_handler::<R, O, D>),
        )
        .with_state(AdminRoutes {
            sessions: sessions.clone(),
            users,
            listings: listing_store,
            orders,
        });

    let navigation = axum::Router::new()
        .route(
            "/api/v1/navigation",
            axum::routing::get(navigation_handler::<D>),
        )
        .with_state(sessions.clone());

    listing_router(listings, sessions.clone())
        .merge(account_router(sessions.clone()))
        .merge(billing_router(billing, sessions))
        .merge(admin)
        .merge(navigation)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

#[derive(Debug, Serialize)]
pub(crate) struct PageView {
    pub(crate) page: Page,
    pub(crate) tag: &'static str,
    pub(crate) required_access: AccessLevel,
    pub(crate) visible: bool,
}

/// The page capability table, evaluated for the caller. Anonymous callers get
/// the guest view; a bearer token upgrades it.
pub(crate) async fn navigation_handler<D>(
    axum::extract::State(sessions): axum::extract::State<Arc<SessionService<D>>>,
    headers: HeaderMap,
) -> Json<Vec<PageView>>
where
    D: UserDirectory + 'static,
{
    let visitor = bearer_token(&headers).and_then(|token| sessions.current_user(token).ok());

    let pages = Page::ordered()
        .into_iter()
        .map(|page| PageView {
            page,
            tag: page.tag(),
            required_access: page.required_access(),
            visible: page.visible_to(visitor.as_ref()),
        })
        .collect();

    Json(pages)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) struct AdminRoutes<R, O, D> {
    pub(crate) sessions: Arc<SessionService<D>>,
    pub(crate) users: Arc<D>,
    pub(crate) listings: Arc<R>,
    pub(crate) orders: Arc<O>,
}

impl<R, O, D> Clone for AdminRoutes<R, O, D> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            users: Arc::clone(&self.users),
            listings: Arc::clone(&self.listings),
            orders: Arc::clone(&self.orders),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminTotals {
    pub(crate) users: usize,
    pub(crate) listings: usize,
    pub(crate) active_listings: usize,
    pub(crate) completed_orders: usize,
    /// Settled revenue in VND.
    pub(crate) revenue: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminOverviewResponse {
    pub(crate) totals: AdminTotals,
    pub(crate) users: Vec<User>,
    pub(crate) listings: Vec<Listing>,
    pub(crate) orders: Vec<Order>,
}

pub(crate) async fn admin_overview_handler<R, O, D>(
    axum::extract::State(state): axum::extract::State<AdminRoutes<R, O, D>>,
    headers: HeaderMap,
) -> axum::response::Response
where
    R: ListingRepository + 'static,
    O: OrderStore + 'static,
    D: UserDirectory + 'static,
{
    let caller = match require_session(&state.sessions, &headers) {
        Ok(user) => user,
        Err(denied) => return denied,
    };
    if caller.role != UserRole::Manager {
        let payload = json!({ "error": "the admin overview requires the manager role" });
        return (StatusCode::FORBIDDEN, Json(payload)).into_response();
    }

    let users = state.users.all();
    let listings = state.listings.all();
    let orders = state.orders.all();

    let (users, listings, orders) = match (users, listings, orders) {
        (Ok(users), Ok(listings), Ok(orders)) => (users, listings, orders),
        _ => {
            let payload = json!({ "error": "a backing store is unavailable" });
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
        }
    };

    let active_listings = listings.iter().filter(|listing| listing.active).count();
    let completed: Vec<&Order> = orders
        .iter()
        .filter(|order| order.status == OrderStatus::Completed)
        .collect();
    let revenue = completed.iter().map(|order| order.package.price).sum();

    let response = AdminOverviewResponse {
        totals: AdminTotals {
            users: users.len(),
            listings: listings.len(),
            active_listings,
            completed_orders: completed.len(),
            revenue,
        },
        users,
        listings,
        orders,
    };

    (StatusCode::OK, Json(response)).into_response()
}
