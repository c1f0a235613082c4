use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::sessions::AuthenticatedUser;

use super::super::error::{ApiError, service_to_api};
use super::super::models::{CategoryQuery, CreatedResponse, ListQuery, PostCreateRequest};
use super::super::state::ApiState;
use super::page_from_query;

pub async fn create_post(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<PostCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload
        .map_err(|err| ApiError::bad_request("invalid post payload", Some(err.body_text())))?;

    let id = state
        .posts
        .insert_post(payload.into(), user.user_id)
        .await
        .map_err(service_to_api)?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn get_post(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .posts
        .get_post(post_id, user.user_id)
        .await
        .map_err(service_to_api)?;
    Ok(Json(post))
}

/// -------- Listings --------
pub async fn list_posts(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_from_query(query.page)?;
    let category = query.category.unwrap_or_default();

    let posts = state
        .posts
        .list_posts(page, &category)
        .await
        .map_err(service_to_api)?;
    Ok(Json(posts))
}

pub async fn list_my_posts(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_from_query(query.page)?;
    let category = query.category.unwrap_or_default();

    let posts = state
        .posts
        .list_my_posts(user.user_id, page, &category)
        .await
        .map_err(service_to_api)?;
    Ok(Json(posts))
}

pub async fn list_my_liked_posts(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_from_query(query.page)?;
    let category = query.category.unwrap_or_default();

    let posts = state
        .posts
        .list_my_liked_posts(user.user_id, page, &category)
        .await
        .map_err(service_to_api)?;
    Ok(Json(posts))
}

/// -------- Metadata --------
pub async fn post_metadata(
    State(state): State<ApiState>,
    Query(query): Query<CategoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = query.category.unwrap_or_default();
    let metadata = state
        .posts
        .post_metadata(&category)
        .await
        .map_err(service_to_api)?;
    Ok(Json(metadata))
}

pub async fn my_post_metadata(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<CategoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = query.category.unwrap_or_default();
    let metadata = state
        .posts
        .my_post_metadata(user.user_id, &category)
        .await
        .map_err(service_to_api)?;
    Ok(Json(metadata))
}

pub async fn my_liked_post_metadata(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<CategoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = query.category.unwrap_or_default();
    let metadata = state
        .posts
        .my_liked_post_metadata(user.user_id, &category)
        .await
        .map_err(service_to_api)?;
    Ok(Json(metadata))
}
