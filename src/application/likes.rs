use std::sync::Arc;

use axum::http::StatusCode;

use crate::application::error::ServiceError;
use crate::application::repos::{LikesRepo, PostsRepo};

#[derive(Clone)]
pub struct LikeService {
    posts: Arc<dyn PostsRepo>,
    likes: Arc<dyn LikesRepo>,
}

impl LikeService {
    pub fn new(posts: Arc<dyn PostsRepo>, likes: Arc<dyn LikesRepo>) -> Self {
        Self { posts, likes }
    }

    pub async fn like_post(&self, user_id: i64, post_id: i64) -> Result<(), ServiceError> {
        self.ensure_post_exists(post_id).await?;
        self.likes.like_post(user_id, post_id).await?;
        Ok(())
    }

    pub async fn unlike_post(&self, user_id: i64, post_id: i64) -> Result<(), ServiceError> {
        self.ensure_post_exists(post_id).await?;
        self.likes.unlike_post(user_id, post_id).await?;
        Ok(())
    }

    async fn ensure_post_exists(&self, post_id: i64) -> Result<(), ServiceError> {
        match self.posts.find_post(post_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::user("post not found", StatusCode::NOT_FOUND)),
        }
    }
}
