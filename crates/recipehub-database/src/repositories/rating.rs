//! Rating repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use recipehub_core::error::{AppError, ErrorKind};
use recipehub_core::result::AppResult;
use recipehub_entity::recipe::RatingSummary;

/// Repository for recipe ratings.
///
/// One rating per (recipe, user); re-rating overwrites the previous value.
#[derive(Debug, Clone)]
pub struct RatingRepository {
    pool: PgPool,
}

impl RatingRepository {
    /// Create a new rating repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or overwrite a user's rating for a recipe.
    pub async fn upsert(&self, recipe_id: Uuid, user_id: Uuid, value: i16) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO ratings (recipe_id, user_id, value) VALUES ($1, $2, $3) \
             ON CONFLICT (recipe_id, user_id) DO UPDATE SET value = $3, updated_at = NOW()",
        )
        .bind(recipe_id)
        .bind(user_id)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert rating", e))?;
        Ok(())
    }

    /// Recompute the aggregate rating for a recipe.
    pub async fn summary(&self, recipe_id: Uuid) -> AppResult<RatingSummary> {
        sqlx::query_as::<_, RatingSummary>(
            "SELECT COALESCE(AVG(value::float8), 0.0) AS average_rating, \
                    COUNT(*) AS total_ratings \
             FROM ratings WHERE recipe_id = $1",
        )
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to compute rating summary", e))
    }
}
