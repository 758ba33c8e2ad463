//! Client-side unread badge reducer.
//!
//! Keeps a locally displayed unread count that approximates server truth
//! with low latency. The transport is room-scoped but still broadcast-like,
//! so the receiver filters by recipient id as well. Local adjustments are a
//! display optimization only: the periodic authoritative fetch (or the
//! server's `unread-count` push) always overwrites them.

use uuid::Uuid;

use crate::message::ServerMessage;

/// Receiver-side reducer for the unread notification badge.
#[derive(Debug, Clone)]
pub struct BadgeSynchronizer {
    /// The session's user id; frames addressed elsewhere are ignored.
    user_id: Uuid,
    /// Current displayed count.
    count: i64,
}

impl BadgeSynchronizer {
    /// Creates a reducer for the given session user.
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id, count: 0 }
    }

    /// The currently displayed unread count.
    pub fn count(&self) -> i64 {
        self.count
    }

    /// Applies one incoming frame.
    ///
    /// Returns `true` when the displayed count changed.
    pub fn apply(&mut self, message: &ServerMessage) -> bool {
        match message {
            ServerMessage::NewNotification { recipient_id, .. } => {
                if *recipient_id != self.user_id {
                    return false;
                }
                self.count += 1;
                true
            }
            ServerMessage::NotificationRemoved { recipient_id, .. } => {
                // An absent recipient means the sender-side did not address
                // the frame; treat it as ours, floored at zero.
                if recipient_id.is_some_and(|id| id != self.user_id) {
                    return false;
                }
                let before = self.count;
                self.count = (self.count - 1).max(0);
                self.count != before
            }
            ServerMessage::UnreadCount {
                recipient_id,
                count,
            } => {
                if *recipient_id != self.user_id {
                    return false;
                }
                self.refresh(*count);
                true
            }
            _ => false,
        }
    }

    /// Overwrites the local approximation with an authoritative count.
    pub fn refresh(&mut self, authoritative: i64) {
        self.count = authoritative.max(0);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use recipehub_entity::notification::NotificationKind;
    use recipehub_entity::user::UserBrief;

    use super::*;

    fn new_notification(recipient: Uuid) -> ServerMessage {
        ServerMessage::NewNotification {
            notification_id: Uuid::new_v4(),
            kind: NotificationKind::Like,
            message: "someone liked your recipe".to_string(),
            is_read: false,
            created_at: Utc::now(),
            recipient_id: recipient,
            sender: UserBrief {
                id: Uuid::new_v4(),
                username: "sender".to_string(),
                display_name: None,
                avatar_url: None,
            },
            recipe: None,
        }
    }

    fn removed(recipient: Option<Uuid>) -> ServerMessage {
        ServerMessage::NotificationRemoved {
            kind: NotificationKind::Like,
            recipe_id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            recipient_id: recipient,
        }
    }

    #[test]
    fn test_increment_on_addressed_notification() {
        let me = Uuid::new_v4();
        let mut badge = BadgeSynchronizer::new(me);

        assert!(badge.apply(&new_notification(me)));
        assert_eq!(badge.count(), 1);
    }

    #[test]
    fn test_foreign_frames_ignored() {
        let me = Uuid::new_v4();
        let mut badge = BadgeSynchronizer::new(me);

        assert!(!badge.apply(&new_notification(Uuid::new_v4())));
        assert!(!badge.apply(&removed(Some(Uuid::new_v4()))));
        assert_eq!(badge.count(), 0);
    }

    #[test]
    fn test_decrement_floors_at_zero() {
        let me = Uuid::new_v4();
        let mut badge = BadgeSynchronizer::new(me);

        assert!(!badge.apply(&removed(None)));
        assert_eq!(badge.count(), 0);

        badge.apply(&new_notification(me));
        badge.apply(&removed(Some(me)));
        badge.apply(&removed(Some(me)));
        assert_eq!(badge.count(), 0);
    }

    #[test]
    fn test_refresh_overwrites_drift() {
        let me = Uuid::new_v4();
        let mut badge = BadgeSynchronizer::new(me);

        // A missed removal leaves the local count too high.
        badge.apply(&new_notification(me));
        badge.apply(&new_notification(me));
        assert_eq!(badge.count(), 2);

        badge.refresh(1);
        assert_eq!(badge.count(), 1);
    }

    #[test]
    fn test_interleaved_stream_converges_after_refresh() {
        let me = Uuid::new_v4();
        let mut badge = BadgeSynchronizer::new(me);
        let other = Uuid::new_v4();

        // Arbitrary interleaving of addressed and foreign events; the
        // authoritative store says 3 unread at the end.
        let events = [
            new_notification(me),
            new_notification(other),
            removed(Some(me)),
            new_notification(me),
            removed(None),
            new_notification(me),
            new_notification(me),
            removed(Some(other)),
        ];
        for event in &events {
            badge.apply(event);
        }

        let authoritative = 3;
        badge.refresh(authoritative);
        assert_eq!(badge.count(), authoritative);
    }

    #[test]
    fn test_unread_count_push_is_authoritative() {
        let me = Uuid::new_v4();
        let mut badge = BadgeSynchronizer::new(me);

        badge.apply(&new_notification(me));
        assert!(badge.apply(&ServerMessage::UnreadCount {
            recipient_id: me,
            count: 7,
        }));
        assert_eq!(badge.count(), 7);

        assert!(!badge.apply(&ServerMessage::UnreadCount {
            recipient_id: Uuid::new_v4(),
            count: 99,
        }));
        assert_eq!(badge.count(), 7);
    }
}
