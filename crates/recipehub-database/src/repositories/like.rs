//! Recipe like repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use recipehub_core::error::{AppError, ErrorKind};
use recipehub_core::result::AppResult;

/// Repository for the recipe_likes join table.
///
/// The table has a primary key on (recipe_id, user_id), so inserts are
/// naturally idempotent with `ON CONFLICT DO NOTHING`.
#[derive(Debug, Clone)]
pub struct LikeRepository {
    pool: PgPool,
}

impl LikeRepository {
    /// Create a new like repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a like. Returns `true` if the row was newly inserted.
    pub async fn insert(&self, recipe_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO recipe_likes (recipe_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (recipe_id, user_id) DO NOTHING",
        )
        .bind(recipe_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert like", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a like. Returns `true` if a row was deleted.
    pub async fn delete(&self, recipe_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM recipe_likes WHERE recipe_id = $1 AND user_id = $2",
        )
        .bind(recipe_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete like", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Count likes for a recipe.
    pub async fn count_for_recipe(&self, recipe_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM recipe_likes WHERE recipe_id = $1")
            .bind(recipe_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count likes", e))
    }
}
