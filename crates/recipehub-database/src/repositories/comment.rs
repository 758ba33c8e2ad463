//! Comment repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use recipehub_core::error::{AppError, ErrorKind};
use recipehub_core::result::AppResult;
use recipehub_entity::comment::Comment;

/// Repository for recipe comments.
#[derive(Debug, Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    /// Create a new comment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a comment and return the stored row.
    pub async fn create(
        &self,
        recipe_id: Uuid,
        author_id: Uuid,
        body: &str,
    ) -> AppResult<Comment> {
        sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (recipe_id, author_id, body) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(recipe_id)
        .bind(author_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create comment", e))
    }

    /// List comments for a recipe, newest first.
    pub async fn find_by_recipe(&self, recipe_id: Uuid, limit: i64) -> AppResult<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE recipe_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(recipe_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list comments", e))
    }
}
