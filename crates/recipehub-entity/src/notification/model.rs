//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::NotificationKind;

/// A notification to be delivered to a user.
///
/// For `kind = like` at most one row may exist per
/// (recipient_id, sender_id, recipe_id) — a like is a toggle, enforced by a
/// partial unique index.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The recipient user.
    pub recipient_id: Uuid,
    /// The user whose action produced this notification.
    pub sender_id: Uuid,
    /// The recipe involved, if any.
    pub recipe_id: Option<Uuid>,
    /// The action kind.
    pub kind: NotificationKind,
    /// Rendered human-readable message.
    pub message: String,
    /// Whether the recipient has read this notification.
    pub is_read: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Check if the notification has not been read yet.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }
}
