use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use super::super::error::{ApiError, service_to_api};
use super::super::state::ApiState;

pub async fn list_categories(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .posts
        .list_categories()
        .await
        .map_err(service_to_api)?;
    Ok(Json(categories))
}
