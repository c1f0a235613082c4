use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::sessions::SessionError;

use super::error::ApiError;
use super::state::ApiState;

const SESSION_COOKIE: &str = "session";

/// Resolve the session token and attach the `AuthenticatedUser` to the request.
pub async fn require_session(
    State(state): State<ApiState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = match extract_token(request.headers()) {
        Some(token) => token,
        None => return ApiError::unauthorized("Session required").into_response(),
    };

    let user = match state.sessions.authenticate(&token).await {
        Ok(user) => user,
        Err(SessionError::Expired) => {
            return ApiError::unauthorized("Session expired").into_response();
        }
        Err(SessionError::Repo(err)) => {
            return ApiError::internal(format!("session lookup failed: {err}")).into_response();
        }
        Err(_) => return ApiError::unauthorized("Session required").into_response(),
    };

    request.extensions_mut().insert(user);
    let mut response = next.run(request).await;
    response.extensions_mut().insert(user);
    response
}

fn extract_token(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers).or_else(|| session_cookie(headers))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
