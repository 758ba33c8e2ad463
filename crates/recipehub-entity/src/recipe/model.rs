//! Recipe entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A published recipe.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    /// Unique recipe identifier.
    pub id: Uuid,
    /// The user who published the recipe.
    pub author_id: Uuid,
    /// Recipe title.
    pub title: String,
    /// Recipe body (ingredients + instructions, rendered elsewhere).
    pub body: String,
    /// Cover image URL.
    pub image_url: Option<String>,
    /// When the recipe was published.
    pub created_at: DateTime<Utc>,
    /// When the recipe was last edited.
    pub updated_at: DateTime<Utc>,
}

/// Narrow owner/title view used when resolving notification targets.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecipeHead {
    /// Unique recipe identifier.
    pub id: Uuid,
    /// The user who published the recipe.
    pub author_id: Uuid,
    /// Recipe title.
    pub title: String,
}

/// Aggregate rating state for a recipe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, FromRow)]
pub struct RatingSummary {
    /// Mean of all rating values, 0.0 when unrated.
    pub average_rating: f64,
    /// Number of ratings submitted.
    pub total_ratings: i64,
}
