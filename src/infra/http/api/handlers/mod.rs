pub mod categories;
pub mod comments;
pub mod likes;
pub mod posts;

use crate::application::pagination::PageNumber;

use super::error::{ApiError, codes};

/// Missing page means the first one; anything below 1 is rejected.
fn page_from_query(page: Option<i64>) -> Result<PageNumber, ApiError> {
    match page {
        None => Ok(PageNumber::FIRST),
        Some(value) => PageNumber::new(value).map_err(|err| {
            ApiError::new(
                axum::http::StatusCode::BAD_REQUEST,
                codes::INVALID_PAGE,
                "invalid page",
                Some(err.to_string()),
            )
        }),
    }
}
