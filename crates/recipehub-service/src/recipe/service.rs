//! Primary recipe interaction mutations: likes, comments, ratings.
//!
//! These are the writes whose failure is reported back to the acting user.
//! Notification side effects are reconciled afterwards and are best-effort.

use std::sync::Arc;

use uuid::Uuid;

use recipehub_core::error::AppError;
use recipehub_core::result::AppResult;
use recipehub_database::repositories::{
    CommentRepository, LikeRepository, RatingRepository, RecipeRepository, UserRepository,
};
use recipehub_entity::comment::CommentView;
use recipehub_entity::recipe::RatingSummary;

use crate::context::RequestContext;

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeChange {
    /// A like row was inserted.
    Applied,
    /// A like row was removed.
    Removed,
    /// The request matched the stored state already.
    Unchanged,
}

/// Orchestrates recipe interaction writes.
#[derive(Debug, Clone)]
pub struct RecipeService {
    recipe_repo: Arc<RecipeRepository>,
    like_repo: Arc<LikeRepository>,
    comment_repo: Arc<CommentRepository>,
    rating_repo: Arc<RatingRepository>,
    user_repo: Arc<UserRepository>,
}

impl RecipeService {
    /// Creates a new recipe service.
    pub fn new(
        recipe_repo: Arc<RecipeRepository>,
        like_repo: Arc<LikeRepository>,
        comment_repo: Arc<CommentRepository>,
        rating_repo: Arc<RatingRepository>,
        user_repo: Arc<UserRepository>,
    ) -> Self {
        Self {
            recipe_repo,
            like_repo,
            comment_repo,
            rating_repo,
            user_repo,
        }
    }

    /// Applies or removes the acting user's like on a recipe.
    pub async fn set_like(
        &self,
        ctx: &RequestContext,
        recipe_id: Uuid,
        liked: bool,
    ) -> AppResult<LikeChange> {
        self.require_recipe(recipe_id).await?;

        let changed = if liked {
            self.like_repo.insert(recipe_id, ctx.user_id).await?
        } else {
            self.like_repo.delete(recipe_id, ctx.user_id).await?
        };

        Ok(match (liked, changed) {
            (_, false) => LikeChange::Unchanged,
            (true, true) => LikeChange::Applied,
            (false, true) => LikeChange::Removed,
        })
    }

    /// Stores a comment and returns it joined with the author profile.
    pub async fn add_comment(
        &self,
        ctx: &RequestContext,
        recipe_id: Uuid,
        body: &str,
    ) -> AppResult<CommentView> {
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::validation("Comment text must not be empty"));
        }
        self.require_recipe(recipe_id).await?;

        let author = self
            .user_repo
            .find_brief(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", ctx.user_id)))?;
        let comment = self.comment_repo.create(recipe_id, ctx.user_id, body).await?;

        Ok(CommentView::from_parts(comment, author))
    }

    /// Upserts the acting user's rating and returns the recomputed summary.
    pub async fn rate_recipe(
        &self,
        ctx: &RequestContext,
        recipe_id: Uuid,
        value: i16,
    ) -> AppResult<RatingSummary> {
        if !(1..=5).contains(&value) {
            return Err(AppError::validation("Rating must be between 1 and 5"));
        }
        self.require_recipe(recipe_id).await?;

        self.rating_repo.upsert(recipe_id, ctx.user_id, value).await?;
        self.rating_repo.summary(recipe_id).await
    }

    async fn require_recipe(&self, recipe_id: Uuid) -> AppResult<()> {
        if self.recipe_repo.find_head(recipe_id).await?.is_none() {
            return Err(AppError::not_found(format!("Recipe {recipe_id} not found")));
        }
        Ok(())
    }
}
