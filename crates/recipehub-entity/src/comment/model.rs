//! Comment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::user::UserBrief;

/// A comment left on a recipe.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    /// Unique comment identifier.
    pub id: Uuid,
    /// The recipe the comment belongs to.
    pub recipe_id: Uuid,
    /// The user who wrote the comment.
    pub author_id: Uuid,
    /// Comment text.
    pub body: String,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
}

/// A comment joined with its author, as delivered to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    /// Unique comment identifier.
    pub comment_id: Uuid,
    /// Comment text.
    pub comment_text: String,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
    /// The comment author.
    pub user: UserBrief,
}

impl CommentView {
    /// Join a stored comment with its author.
    pub fn from_parts(comment: Comment, user: UserBrief) -> Self {
        Self {
            comment_id: comment.id,
            comment_text: comment.body,
            created_at: comment.created_at,
            user,
        }
    }
}
