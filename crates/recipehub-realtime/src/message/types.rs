//! Inbound and outbound WebSocket message type definitions.
//!
//! Every frame is a JSON envelope `{"event": ..., "data": ...}`. Payload
//! field casing follows the established client contract, which mixes
//! camelCase action payloads with snake_case notification bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use recipehub_entity::comment::CommentView;
use recipehub_entity::notification::{Notification, NotificationKind};
use recipehub_entity::recipe::RecipeHead;
use recipehub_entity::user::UserBrief;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Join one's own personal notification room.
    #[serde(rename_all = "camelCase")]
    JoinUserRoom {
        /// The user room to join. Must match the authenticated identity.
        user_id: Uuid,
    },
    /// Join a recipe's activity room.
    #[serde(rename_all = "camelCase")]
    JoinRecipeRoom {
        /// Recipe ID.
        recipe_id: Uuid,
    },
    /// Leave a recipe's activity room.
    #[serde(rename_all = "camelCase")]
    LeaveRecipeRoom {
        /// Recipe ID.
        recipe_id: Uuid,
    },
    /// Toggle a like on a recipe.
    #[serde(rename_all = "camelCase")]
    LikeRecipe {
        /// Recipe ID.
        recipe_id: Uuid,
        /// Claimed actor. Checked against the authenticated identity when
        /// present; the authenticated identity is what gets used.
        #[serde(default)]
        user_id: Option<Uuid>,
        /// Desired like state.
        is_liked: bool,
    },
    /// Post a comment on a recipe.
    #[serde(rename_all = "camelCase")]
    NewComment {
        /// Recipe ID.
        recipe_id: Uuid,
        /// Claimed actor, see [`ClientMessage::LikeRecipe`].
        #[serde(default)]
        user_id: Option<Uuid>,
        /// Comment text.
        comment_text: String,
    },
    /// Rate a recipe.
    #[serde(rename_all = "camelCase")]
    RateRecipe {
        /// Recipe ID.
        recipe_id: Uuid,
        /// Claimed actor, see [`ClientMessage::LikeRecipe`].
        #[serde(default)]
        user_id: Option<Uuid>,
        /// Rating value, 1-5.
        rating: i16,
    },
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// A notification was created for the recipient.
    NewNotification {
        /// Stored notification ID.
        notification_id: Uuid,
        /// Notification kind.
        #[serde(rename = "type")]
        kind: NotificationKind,
        /// Rendered message.
        message: String,
        /// Read state (always false on creation).
        is_read: bool,
        /// Creation timestamp.
        created_at: DateTime<Utc>,
        /// The recipient. Receivers must ignore frames addressed elsewhere.
        recipient_id: Uuid,
        /// The acting user.
        sender: UserBrief,
        /// The recipe involved, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recipe: Option<RecipeRef>,
    },
    /// A notification slot was removed (like undone).
    #[serde(rename_all = "camelCase")]
    NotificationRemoved {
        /// Removed notification kind.
        #[serde(rename = "type")]
        kind: NotificationKind,
        /// The recipe involved.
        recipe_id: Uuid,
        /// The user whose undo caused the removal.
        sender_id: Uuid,
        /// The recipient, when known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recipient_id: Option<Uuid>,
    },
    /// A comment was added to a recipe the client is watching.
    CommentAdded {
        /// The new comment joined with its author.
        comment: CommentView,
    },
    /// A recipe's aggregate rating changed.
    #[serde(rename_all = "camelCase")]
    RatingUpdated {
        /// Recipe ID.
        recipe_id: Uuid,
        /// New mean rating.
        average_rating: f64,
        /// New rating count.
        total_ratings: i64,
    },
    /// Authoritative unread count push for the recipient.
    UnreadCount {
        /// The recipient.
        recipient_id: Uuid,
        /// Current unread count.
        count: i64,
    },
    /// Room join confirmed.
    RoomJoined {
        /// Room key.
        room: String,
    },
    /// Room leave confirmed.
    RoomLeft {
        /// Room key.
        room: String,
    },
    /// Request-level error.
    Error {
        /// Machine-readable error code.
        code: String,
        /// Human-readable description.
        message: String,
    },
}

/// Compact recipe reference embedded in notification payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeRef {
    /// Recipe ID.
    pub id: Uuid,
    /// Recipe title.
    pub title: String,
}

impl From<&RecipeHead> for RecipeRef {
    fn from(head: &RecipeHead) -> Self {
        Self {
            id: head.id,
            title: head.title.clone(),
        }
    }
}

impl ServerMessage {
    /// Builds the `new-notification` frame for a stored notification.
    pub fn new_notification(
        notification: &Notification,
        sender: UserBrief,
        recipe: Option<RecipeRef>,
    ) -> Self {
        Self::NewNotification {
            notification_id: notification.id,
            kind: notification.kind,
            message: notification.message.clone(),
            is_read: notification.is_read,
            created_at: notification.created_at,
            recipient_id: notification.recipient_id,
            sender,
            recipe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_wire_shape() {
        let recipe_id = Uuid::new_v4();
        let json = format!(
            r#"{{"event":"like-recipe","data":{{"recipeId":"{recipe_id}","isLiked":true}}}}"#
        );
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        match msg {
            ClientMessage::LikeRecipe {
                recipe_id: id,
                user_id,
                is_liked,
            } => {
                assert_eq!(id, recipe_id);
                assert_eq!(user_id, None);
                assert!(is_liked);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_join_room_events_use_kebab_case() {
        let user_id = Uuid::new_v4();
        let json = format!(r#"{{"event":"join-user-room","data":{{"userId":"{user_id}"}}}}"#);
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(msg, ClientMessage::JoinUserRoom { user_id: id } if id == user_id));
    }

    #[test]
    fn test_notification_removed_shape() {
        let msg = ServerMessage::NotificationRemoved {
            kind: NotificationKind::Like,
            recipe_id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            recipient_id: None,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["event"], "notification-removed");
        assert_eq!(value["data"]["type"], "like");
        assert!(value["data"].get("recipeId").is_some());
        assert!(value["data"].get("senderId").is_some());
        // Absent recipient is omitted, not null.
        assert!(value["data"].get("recipientId").is_none());
    }

    #[test]
    fn test_rating_updated_shape() {
        let msg = ServerMessage::RatingUpdated {
            recipe_id: Uuid::new_v4(),
            average_rating: 4.5,
            total_ratings: 2,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["event"], "rating-updated");
        assert_eq!(value["data"]["averageRating"], 4.5);
        assert_eq!(value["data"]["totalRatings"], 2);
    }

    #[test]
    fn test_new_notification_carries_recipient() {
        let sender = UserBrief {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            display_name: None,
            avatar_url: None,
        };
        let recipient = Uuid::new_v4();
        let msg = ServerMessage::NewNotification {
            notification_id: Uuid::new_v4(),
            kind: NotificationKind::Comment,
            message: "alice commented on your recipe".to_string(),
            is_read: false,
            created_at: Utc::now(),
            recipient_id: recipient,
            sender,
            recipe: None,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["event"], "new-notification");
        assert_eq!(value["data"]["recipient_id"], recipient.to_string());
        assert_eq!(value["data"]["type"], "comment");
        assert_eq!(value["data"]["sender"]["username"], "alice");
    }
}
