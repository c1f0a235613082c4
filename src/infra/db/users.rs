use async_trait::async_trait;

use crate::application::repos::{RepoError, UsersRepo};

use super::{PostgresRepositories, util::map_sqlx_error};

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn username_by_id(&self, id: i64) -> Result<String, RepoError> {
        sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE id = $1")
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }
}
