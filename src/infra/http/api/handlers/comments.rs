use axum::Json;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bytes::Bytes;
use tracing::{error, warn};

use crate::application::comments::CommentError;
use crate::application::sessions::AuthenticatedUser;

use super::super::error::{ApiError, comment_to_api};
use super::super::models::CommentCreateRequest;
use super::super::state::ApiState;

/// `POST /comments`. Other methods never reach here; the router answers them with 405.
pub async fn create_comment(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Result<Bytes, BytesRejection>,
) -> Result<StatusCode, ApiError> {
    let body = match body {
        Ok(body) if !body.is_empty() => body,
        Ok(_) => {
            warn!(
                target = "forum::http::comments",
                user_id = user.user_id,
                "comment request body is empty"
            );
            return Err(ApiError::bad_request("request body is empty", None));
        }
        Err(err) => {
            warn!(
                target = "forum::http::comments",
                user_id = user.user_id,
                error = %err,
                "failed to read comment request body"
            );
            return Err(ApiError::bad_request(
                "failed to read request body",
                Some(err.body_text()),
            ));
        }
    };

    let request: CommentCreateRequest = serde_json::from_slice(&body).map_err(|err| {
        warn!(
            target = "forum::http::comments",
            user_id = user.user_id,
            error = %err,
            "malformed comment payload"
        );
        ApiError::bad_request("malformed comment payload", Some(err.to_string()))
    })?;

    let post_id = request.post_id;
    match state
        .comments
        .insert_comment(request.into(), user.user_id)
        .await
    {
        Ok(_) => Ok(StatusCode::CREATED),
        Err(err @ CommentError::EmptyBody) => {
            warn!(
                target = "forum::http::comments",
                user_id = user.user_id,
                post_id,
                "empty comment content"
            );
            Err(comment_to_api(err))
        }
        Err(err) => {
            error!(
                target = "forum::http::comments",
                user_id = user.user_id,
                error = %err,
                "failed to store comment"
            );
            Err(comment_to_api(err))
        }
    }
}

pub async fn list_comments(
    State(state): State<ApiState>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = state
        .comments
        .list_comments(post_id)
        .await
        .map_err(comment_to_api)?;
    Ok(Json(comments))
}
