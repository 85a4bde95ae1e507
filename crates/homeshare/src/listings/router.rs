use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
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

use super::domain::{ListingCategory, ListingDraft, ListingId, ListingPatch};
use super::query::{FilterSpec, SortKey};
use super::repository::{FeedView, ListingRepository, RepositoryError};
use super::service::{ListingService, ListingServiceError};

pub struct ListingRoutes<R, D> {
    pub listings: Arc<ListingService<R, D>>,
    pub sessions: Arc<SessionService<D>>,
}

impl<R, D> Clone for ListingRoutes<R, D> {
    fn clone(&self) -> Self {
        Self {
            listings: Arc::clone(&self.listings),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

/// Router builder exposing the feed, detail, and owner mutation endpoints.
pub fn listing_router<R, D>(
    listings: Arc<ListingService<R, D>>,
    sessions: Arc<SessionService<D>>,
) -> Router
where
    R: ListingRepository + 'static,
    D: UserDirectory + 'static,
{
    let state = ListingRoutes { listings, sessions };
    Router::new()
        .route(
            "/api/v1/listings",
            get(feed_handler::<R, D>).post(submit_handler::<R, D>),
        )
        .route(
            "/api/v1/listings/:listing_id",
            get(detail_handler::<R, D>)
                .patch(amend_handler::<R, D>)
                .delete(remove_handler::<R, D>),
        )
        .with_state(state)
}

/// Raw feed query params. Price bounds and the sort key arrive as strings;
/// `FilterSpec::from_params` owns their normalization.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FeedParams {
    pub(crate) category: Option<String>,
    pub(crate) q: Option<String>,
    pub(crate) location: Option<String>,
    pub(crate) min_price: Option<String>,
    pub(crate) max_price: Option<String>,
    pub(crate) sort: Option<String>,
}

pub(crate) async fn feed_handler<R, D>(
    State(state): State<ListingRoutes<R, D>>,
    Query(params): Query<FeedParams>,
) -> Response
where
    R: ListingRepository + 'static,
    D: UserDirectory + 'static,
{
    let category = params
        .category
        .as_deref()
        .and_then(ListingCategory::from_param);
    let spec = FilterSpec::from_params(
        params.q.as_deref(),
        params.location.as_deref(),
        params.min_price.as_deref(),
        params.max_price.as_deref(),
    );
    // absent -> newest; present but unrecognized -> store order
    let sort = match params.sort.as_deref() {
        None => Some(SortKey::Newest),
        Some(raw) => SortKey::from_param(raw),
    };

    match state.listings.feed(category, &spec, sort) {
        Ok(listings) => (StatusCode::OK, Json(FeedView::new(listings))).into_response(),
        Err(error) => listing_error_response(error),
    }
}

pub(crate) async fn detail_handler<R, D>(
    State(state): State<ListingRoutes<R, D>>,
    Path(listing_id): Path<String>,
) -> Response
where
    R: ListingRepository + 'static,
    D: UserDirectory + 'static,
{
    let id = ListingId(listing_id);
    match state.listings.get(&id) {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(error) => listing_error_response(error),
    }
}

pub(crate) async fn submit_handler<R, D>(
    State(state): State<ListingRoutes<R, D>>,
    headers: HeaderMap,
    Json(draft): Json<ListingDraft>,
) -> Response
where
    R: ListingRepository + 'static,
    D: UserDirectory + 'static,
{
    let user = match require_session(&state.sessions, &headers) {
        Ok(user) => user,
        Err(denied) => return denied,
    };

    match state.listings.submit(&user.id, draft) {
        Ok(listing) => (StatusCode::CREATED, Json(listing)).into_response(),
        Err(error) => listing_error_response(error),
    }
}

pub(crate) async fn amend_handler<R, D>(
    State(state): State<ListingRoutes<R, D>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
    Json(patch): Json<ListingPatch>,
) -> Response
where
    R: ListingRepository + 'static,
    D: UserDirectory + 'static,
{
    let user = match require_session(&state.sessions, &headers) {
        Ok(user) => user,
        Err(denied) => return denied,
    };

    let id = ListingId(listing_id);
    match state.listings.amend(&user, &id, patch) {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(error) => listing_error_response(error),
    }
}

pub(crate) async fn remove_handler<R, D>(
    State(state): State<ListingRoutes<R, D>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    R: ListingRepository + 'static,
    D: UserDirectory + 'static,
{
    let user = match require_session(&state.sessions, &headers) {
        Ok(user) => user,
        Err(denied) => return denied,
    };

    let id = ListingId(listing_id);
    match state.listings.remove(&user, &id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => listing_error_response(error),
    }
}

fn listing_error_response(error: ListingServiceError) -> Response {
    let status = match &error {
        ListingServiceError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ListingServiceError::CreditsExhausted => StatusCode::PAYMENT_REQUIRED,
        ListingServiceError::NotOwner => StatusCode::FORBIDDEN,
        ListingServiceError::UnknownAuthor => StatusCode::NOT_FOUND,
        ListingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ListingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ListingServiceError::Repository(RepositoryError::Unavailable(_))
        | ListingServiceError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
