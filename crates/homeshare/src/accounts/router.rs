use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::directory::UserDirectory;
use super::domain::User;
use super::session::{SessionError, SessionService};

/// Router builder exposing the login/logout/me endpoints.
pub fn account_router<D>(sessions: Arc<SessionService<D>>) -> Router
where
    D: UserDirectory + 'static,
{
    Router::new()
        .route("/api/v1/auth/login", post(login_handler::<D>))
        .route("/api/v1/auth/logout", post(logout_handler::<D>))
        .route("/api/v1/auth/me", get(me_handler::<D>))
        .with_state(sessions)
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

pub(crate) async fn login_handler<D>(
    State(sessions): State<Arc<SessionService<D>>>,
    Json(request): Json<LoginRequest>,
) -> Response
where
    D: UserDirectory + 'static,
{
    match sessions.login(&request.email, &request.password) {
        Ok(grant) => (StatusCode::OK, Json(grant)).into_response(),
        Err(SessionError::InvalidCredentials) => {
            let payload = json!({ "error": SessionError::InvalidCredentials.to_string() });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn logout_handler<D>(
    State(sessions): State<Arc<SessionService<D>>>,
    headers: HeaderMap,
) -> Response
where
    D: UserDirectory + 'static,
{
    if let Some(token) = bearer_token(&headers) {
        sessions.logout(token);
    }
    StatusCode::NO_CONTENT.into_response()
}

pub(crate) async fn me_handler<D>(
    State(sessions): State<Arc<SessionService<D>>>,
    headers: HeaderMap,
) -> Response
where
    D: UserDirectory + 'static,
{
    match require_session(&sessions, &headers) {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(denied) => denied,
    }
}

/// Pull the opaque token out of an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the calling account or produce the 401 response to return as-is.
pub fn require_session<D>(
    sessions: &SessionService<D>,
    headers: &HeaderMap,
) -> Result<User, Response>
where
    D: UserDirectory + 'static,
{
    let Some(token) = bearer_token(headers) else {
        let payload = json!({ "error": "missing bearer token" });
        return Err((StatusCode::UNAUTHORIZED, Json(payload)).into_response());
    };

    sessions.current_user(token).map_err(|error| {
        let status = match error {
            SessionError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        };
        let payload = json!({ "error": error.to_string() });
        (status, Json(payload)).into_response()
    })
}
