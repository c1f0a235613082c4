use async_trait::async_trait;

use crate::{
    application::repos::{CategoriesRepo, RepoError},
    domain::entities::CategoryRecord,
};

use super::{PostgresRepositories, util::map_sqlx_error};

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
}

#[async_trait]
impl CategoriesRepo for PostgresRepositories {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name FROM categories ORDER BY name ASC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryRecord {
                id: row.id,
                name: row.name,
            })
            .collect())
    }

    async fn category_id_by_name(&self, name: &str) -> Result<i64, RepoError> {
        // fetch_one surfaces a missing row as RowNotFound, mapped to NotFound.
        sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE name = $1")
            .bind(name)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }
}
