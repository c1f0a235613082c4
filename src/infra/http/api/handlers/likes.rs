use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use crate::application::sessions::AuthenticatedUser;

use super::super::error::{ApiError, service_to_api};
use super::super::state::ApiState;

pub async fn like_post(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(post_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .likes
        .like_post(user.user_id, post_id)
        .await
        .map_err(service_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unlike_post(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(post_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .likes
        .unlike_post(user.user_id, post_id)
        .await
        .map_err(service_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
