//! Domain entities mirrored from persistent storage.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Serialize, Serializer};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub category_id: i64,
    pub category: String,
    #[serde(serialize_with = "serialize_image")]
    pub image_data: Option<Vec<u8>>,
    pub like_count: i64,
    pub comment_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A post as seen by a particular signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: PostRecord,
    pub liked: bool,
}

/// Input for a new post after validation and image processing.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub category_id: i64,
    pub image_data: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRecord {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: i64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
}

/// Aggregate counts backing the pager of a post listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PostMetadata {
    pub total_posts: u64,
    pub page_size: u32,
    pub total_pages: u64,
}

impl PostMetadata {
    pub fn from_total(total_posts: u64, page_size: u32) -> Self {
        let size = u64::from(page_size.max(1));
        Self {
            total_posts,
            page_size,
            total_pages: total_posts.div_ceil(size),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user_id: i64,
    pub expires_at: OffsetDateTime,
}

fn serialize_image<S>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
        None => serializer.serialize_none(),
    }
}
