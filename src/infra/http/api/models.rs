use serde::{Deserialize, Serialize};

use crate::application::comments::CreateCommentCommand;
use crate::application::posts::CreatePostCommand;

/// Missing fields decode as empty so validation can report them.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PostCreateRequest {
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: String,
    pub image_data: Option<String>,
}

impl From<PostCreateRequest> for CreatePostCommand {
    fn from(request: PostCreateRequest) -> Self {
        Self {
            title: request.title,
            content: request.content,
            author: request.author,
            category: request.category,
            image_data: request.image_data,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CommentCreateRequest {
    pub post_id: i64,
    pub content: String,
}

impl From<CommentCreateRequest> for CreateCommentCommand {
    fn from(request: CommentCreateRequest) -> Self {
        Self {
            post_id: request.post_id,
            content: request.content,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}
