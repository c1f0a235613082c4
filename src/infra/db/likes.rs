use async_trait::async_trait;

use crate::application::repos::{LikesRepo, RepoError};

use super::{PostgresRepositories, util::map_sqlx_error};

#[async_trait]
impl LikesRepo for PostgresRepositories {
    async fn like_post(&self, user_id: i64, post_id: i64) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO likes (user_id, post_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, post_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn unlike_post(&self, user_id: i64, post_id: i64) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn has_liked(&self, user_id: i64, post_id: i64) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM likes WHERE user_id = $1 AND post_id = $2)",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
