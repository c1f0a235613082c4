//! Post creation, detail and listing.

use std::sync::Arc;

use axum::http::StatusCode;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::debug;

use crate::application::error::ServiceError;
use crate::application::pagination::{PAGE_SIZE, PageNumber};
use crate::application::repos::{
    CategoriesRepo, LikesRepo, PostListScope, PostsRepo, PostsWriteRepo, RepoError, UsersRepo,
};
use crate::domain::entities::{CategoryRecord, NewPost, PostMetadata, PostRecord, PostView};
use crate::domain::images::resize_to_fit;

/// Bounding box applied to images attached to new posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLimits {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_width: 500,
            max_height: 500,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreatePostCommand {
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: String,
    /// Base64 (standard alphabet) encoded image.
    pub image_data: Option<String>,
}

#[derive(Clone)]
pub struct PostService {
    reader: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
    categories: Arc<dyn CategoriesRepo>,
    users: Arc<dyn UsersRepo>,
    likes: Arc<dyn LikesRepo>,
    image_limits: ImageLimits,
}

impl PostService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        categories: Arc<dyn CategoriesRepo>,
        users: Arc<dyn UsersRepo>,
        likes: Arc<dyn LikesRepo>,
    ) -> Self {
        Self {
            reader,
            writer,
            categories,
            users,
            likes,
            image_limits: ImageLimits::default(),
        }
    }

    pub fn with_image_limits(mut self, limits: ImageLimits) -> Self {
        self.image_limits = limits;
        self
    }

    /// Validate and store a new post written by `user_id`, returning its id.
    pub async fn insert_post(
        &self,
        command: CreatePostCommand,
        user_id: i64,
    ) -> Result<i64, ServiceError> {
        let username = self
            .users
            .username_by_id(user_id)
            .await
            .map_err(|err| ServiceError::internal(format!("Error getting username: {err}")))?;

        if username != command.author {
            return Err(ServiceError::user(
                "Author not same Username",
                StatusCode::BAD_REQUEST,
            ));
        }

        // A post needs at least one of title or content.
        if command.title.trim().is_empty() && command.content.trim().is_empty() {
            return Err(ServiceError::user(
                "Empty Title or Body",
                StatusCode::BAD_REQUEST,
            ));
        }

        let category_id = self
            .categories
            .category_id_by_name(&command.category)
            .await
            .map_err(|err| ServiceError::internal(format!("Error getting category ID: {err}")))?;

        let image_data = match command.image_data.filter(|data| !data.is_empty()) {
            Some(encoded) => Some(self.prepare_image(&encoded).await?),
            None => None,
        };

        let post = NewPost {
            title: command.title,
            content: command.content,
            author_id: user_id,
            category_id,
            image_data,
        };

        let id = self
            .writer
            .create_post(post)
            .await
            .map_err(|err| ServiceError::internal(format!("Error creating post: {err}")))?;

        debug!(target = "forum::posts", post_id = id, user_id, "post created");
        Ok(id)
    }

    async fn prepare_image(&self, encoded: &str) -> Result<Vec<u8>, ServiceError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| ServiceError::user("Invalid image data", StatusCode::BAD_REQUEST))?;

        let ImageLimits {
            max_width,
            max_height,
        } = self.image_limits;

        tokio::task::spawn_blocking(move || resize_to_fit(&bytes, max_width, max_height))
            .await
            .map_err(|err| ServiceError::internal(format!("Error resizing image: {err}")))?
            .map_err(|err| ServiceError::internal(format!("Error resizing image: {err}")))
    }

    pub async fn get_post(&self, post_id: i64, user_id: i64) -> Result<PostView, ServiceError> {
        let post = self
            .reader
            .find_post(post_id)
            .await?
            .ok_or_else(|| ServiceError::user("post not found", StatusCode::NOT_FOUND))?;
        let liked = self.likes.has_liked(user_id, post_id).await?;

        Ok(PostView { post, liked })
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryRecord>, ServiceError> {
        Ok(self.categories.list_categories().await?)
    }

    pub async fn list_posts(
        &self,
        page: PageNumber,
        category: &str,
    ) -> Result<Vec<PostRecord>, ServiceError> {
        self.list(PostListScope::All, page, category).await
    }

    pub async fn list_my_posts(
        &self,
        user_id: i64,
        page: PageNumber,
        category: &str,
    ) -> Result<Vec<PostRecord>, ServiceError> {
        self.list(PostListScope::AuthoredBy(user_id), page, category)
            .await
    }

    pub async fn list_my_liked_posts(
        &self,
        user_id: i64,
        page: PageNumber,
        category: &str,
    ) -> Result<Vec<PostRecord>, ServiceError> {
        self.list(PostListScope::LikedBy(user_id), page, category)
            .await
    }

    pub async fn post_metadata(&self, category: &str) -> Result<PostMetadata, ServiceError> {
        self.metadata(PostListScope::All, category).await
    }

    pub async fn my_post_metadata(
        &self,
        user_id: i64,
        category: &str,
    ) -> Result<PostMetadata, ServiceError> {
        self.metadata(PostListScope::AuthoredBy(user_id), category)
            .await
    }

    pub async fn my_liked_post_metadata(
        &self,
        user_id: i64,
        category: &str,
    ) -> Result<PostMetadata, ServiceError> {
        self.metadata(PostListScope::LikedBy(user_id), category)
            .await
    }

    // Listings hand category lookup failures back untouched, including NotFound.
    async fn list(
        &self,
        scope: PostListScope,
        page: PageNumber,
        category: &str,
    ) -> Result<Vec<PostRecord>, ServiceError> {
        let category_id = self.resolve_category(category).await?;
        let posts = self
            .reader
            .list_posts(scope, category_id, page.window())
            .await?;
        Ok(posts)
    }

    async fn metadata(
        &self,
        scope: PostListScope,
        category: &str,
    ) -> Result<PostMetadata, ServiceError> {
        let category_id = match self.resolve_category(category).await {
            Ok(id) => id,
            Err(RepoError::NotFound) => {
                return Err(ServiceError::user("wrong category", StatusCode::NOT_FOUND));
            }
            Err(err) => return Err(err.into()),
        };

        let total = self.reader.count_posts(scope, category_id).await?;
        Ok(PostMetadata::from_total(total, PAGE_SIZE))
    }

    async fn resolve_category(&self, category: &str) -> Result<Option<i64>, RepoError> {
        if category.is_empty() {
            return Ok(None);
        }
        self.categories.category_id_by_name(category).await.map(Some)
    }
}
