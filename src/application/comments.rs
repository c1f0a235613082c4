use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::application::repos::{CommentsRepo, RepoError};
use crate::domain::entities::{CommentRecord, NewComment};

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("comment body is empty")]
    EmptyBody,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommentCommand {
    pub post_id: i64,
    pub content: String,
}

#[derive(Clone)]
pub struct CommentService {
    repo: Arc<dyn CommentsRepo>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentsRepo>) -> Self {
        Self { repo }
    }

    /// Store a comment by `user_id`. Content that is blank after trimming is
    /// rejected with [`CommentError::EmptyBody`].
    pub async fn insert_comment(
        &self,
        command: CreateCommentCommand,
        user_id: i64,
    ) -> Result<i64, CommentError> {
        if command.content.trim().is_empty() {
            return Err(CommentError::EmptyBody);
        }

        let id = self
            .repo
            .create_comment(NewComment {
                post_id: command.post_id,
                author_id: user_id,
                content: command.content,
            })
            .await?;

        debug!(
            target = "forum::comments",
            comment_id = id,
            post_id = command.post_id,
            user_id,
            "comment created"
        );
        Ok(id)
    }

    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentRecord>, CommentError> {
        Ok(self.repo.list_for_post(post_id).await?)
    }
}
