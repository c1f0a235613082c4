//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::application::pagination::PageWindow;
use crate::domain::entities::{
    CategoryRecord, CommentRecord, NewComment, NewPost, PostRecord, SessionRecord,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Which posts a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostListScope {
    All,
    AuthoredBy(i64),
    LikedBy(i64),
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Posts in `scope`, newest first. `category_id` of `None` means every category.
    async fn list_posts(
        &self,
        scope: PostListScope,
        category_id: Option<i64>,
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError>;

    async fn count_posts(
        &self,
        scope: PostListScope,
        category_id: Option<i64>,
    ) -> Result<u64, RepoError>;

    async fn find_post(&self, id: i64) -> Result<Option<PostRecord>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, post: NewPost) -> Result<i64, RepoError>;
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError>;

    /// Returns `RepoError::NotFound` when no category has this name.
    async fn category_id_by_name(&self, name: &str) -> Result<i64, RepoError>;
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    /// Returns `RepoError::NotFound` when the user does not exist.
    async fn username_by_id(&self, id: i64) -> Result<String, RepoError>;
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    async fn create_comment(&self, comment: NewComment) -> Result<i64, RepoError>;

    /// Comments on a post, oldest first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentRecord>, RepoError>;
}

#[async_trait]
pub trait LikesRepo: Send + Sync {
    /// Records a like; liking twice is a no-op.
    async fn like_post(&self, user_id: i64, post_id: i64) -> Result<(), RepoError>;

    /// Removes a like; removing a missing like is a no-op.
    async fn unlike_post(&self, user_id: i64, post_id: i64) -> Result<(), RepoError>;

    async fn has_liked(&self, user_id: i64, post_id: i64) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait SessionsRepo: Send + Sync {
    async fn create_session(
        &self,
        token_hash: &[u8],
        user_id: i64,
        expires_at: time::OffsetDateTime,
    ) -> Result<(), RepoError>;

    async fn find_session(&self, token_hash: &[u8]) -> Result<Option<SessionRecord>, RepoError>;
}
