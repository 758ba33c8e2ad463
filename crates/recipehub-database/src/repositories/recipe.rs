//! Recipe repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use recipehub_core::error::{AppError, ErrorKind};
use recipehub_core::result::AppResult;
use recipehub_entity::recipe::{Recipe, RecipeHead};

/// Repository for recipe lookups.
#[derive(Debug, Clone)]
pub struct RecipeRepository {
    pool: PgPool,
}

impl RecipeRepository {
    /// Create a new recipe repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a recipe by id.
    pub async fn find_by_id(&self, recipe_id: Uuid) -> AppResult<Option<Recipe>> {
        sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find recipe", e))
    }

    /// Narrow owner/title lookup used when resolving notification targets.
    pub async fn find_head(&self, recipe_id: Uuid) -> AppResult<Option<RecipeHead>> {
        sqlx::query_as::<_, RecipeHead>(
            "SELECT id, author_id, title FROM recipes WHERE id = $1",
        )
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find recipe head", e))
    }
}
