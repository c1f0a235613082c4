use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;

use crate::{
    application::pagination::PageWindow,
    application::repos::{PostListScope, PostsRepo, PostsWriteRepo, RepoError},
    domain::entities::{NewPost, PostRecord},
};

use super::{
    PostgresRepositories,
    util::{convert_count, map_sqlx_error},
};

const POST_SELECT: &str = "SELECT \
    p.id, p.title, p.content, u.username AS author, p.category_id, c.name AS category, \
    p.image_data, \
    (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count, \
    (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count, \
    p.created_at \
FROM posts p \
INNER JOIN users u ON u.id = p.author_id \
INNER JOIN categories c ON c.id = p.category_id ";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    author: String,
    category_id: i64,
    category: String,
    image_data: Option<Vec<u8>>,
    like_count: i64,
    comment_count: i64,
    created_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            author: row.author,
            category_id: row.category_id,
            category: row.category,
            image_data: row.image_data,
            like_count: row.like_count,
            comment_count: row.comment_count,
            created_at: row.created_at,
        }
    }
}

impl PostgresRepositories {
    fn apply_post_filters(
        qb: &mut QueryBuilder<'_, Postgres>,
        scope: PostListScope,
        category_id: Option<i64>,
    ) {
        qb.push(" WHERE TRUE ");
        match scope {
            PostListScope::All => {}
            PostListScope::AuthoredBy(user_id) => {
                qb.push(" AND p.author_id = ");
                qb.push_bind(user_id);
            }
            PostListScope::LikedBy(user_id) => {
                qb.push(
                    " AND EXISTS (SELECT 1 FROM likes lk WHERE lk.post_id = p.id AND lk.user_id = ",
                );
                qb.push_bind(user_id);
                qb.push(")");
            }
        }

        if let Some(category_id) = category_id {
            qb.push(" AND p.category_id = ");
            qb.push_bind(category_id);
        }
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_posts(
        &self,
        scope: PostListScope,
        category_id: Option<i64>,
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(POST_SELECT);
        Self::apply_post_filters(&mut qb, scope, category_id);
        qb.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ");
        qb.push_bind(window.limit);
        qb.push(" OFFSET ");
        qb.push_bind(window.offset);

        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn count_posts(
        &self,
        scope: PostListScope,
        category_id: Option<i64>,
    ) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts p");
        Self::apply_post_filters(&mut qb, scope, category_id);

        let count: i64 = qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        convert_count(count)
    }

    async fn find_post(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(POST_SELECT);
        qb.push(" WHERE p.id = ");
        qb.push_bind(id);

        let row = qb
            .build_query_as::<PostRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, post: NewPost) -> Result<i64, RepoError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO posts (title, content, author_id, category_id, image_data)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(post.title)
        .bind(post.content)
        .bind(post.author_id)
        .bind(post.category_id)
        .bind(post.image_data)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
