//! Notification reconciliation — translates recipe interactions into the
//! correct notification-table mutation plus the data needed to fan the
//! change out to the recipient.
//!
//! A like is a toggle, so like notifications follow an ABSENT/PRESENT state
//! machine per (recipient, sender, recipe) triple: applying a like while
//! PRESENT must not create a second row, and removing a like deletes every
//! row for the triple. Comments and ratings are additive. Self-actions
//! (recipient == sender) never notify.
//!
//! Two racing handlers for the same triple interleave at their await
//! points, which is exactly how duplicate rows appear. Both defenses from
//! the schema design are used here: operations on the same key are
//! serialized through a per-key async mutex, and the like insert itself is
//! conflict-ignoring against the partial unique index.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use recipehub_core::error::AppError;
use recipehub_core::result::AppResult;
use recipehub_core::types::id::{RecipeId, UserId};
use recipehub_entity::notification::{Notification, NotificationKind};
use recipehub_entity::recipe::RecipeHead;
use recipehub_entity::user::UserBrief;

use super::store::{NotificationStore, ProfileStore, RecipeStore};

/// Serialization key for reconciliation of a single notification slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ReconcileKey {
    recipient: UserId,
    sender: UserId,
    recipe: RecipeId,
    kind: NotificationKind,
}

/// A created notification together with the display data needed to emit
/// `new-notification` to the recipient's room.
#[derive(Debug, Clone)]
pub struct NotificationDelivery {
    /// The stored notification row.
    pub notification: Notification,
    /// The acting user's display data.
    pub sender: UserBrief,
    /// The recipe involved.
    pub recipe: RecipeHead,
    /// Authoritative unread count for the recipient after the mutation.
    pub unread_count: i64,
}

/// A removed notification slot, for emitting `notification-removed`.
#[derive(Debug, Clone)]
pub struct NotificationRemoval {
    /// The recipient whose notification disappeared.
    pub recipient_id: Uuid,
    /// The user whose undo caused the removal.
    pub sender_id: Uuid,
    /// The recipe involved.
    pub recipe_id: Uuid,
    /// The removed notification kind.
    pub kind: NotificationKind,
    /// Authoritative unread count for the recipient after the mutation.
    pub unread_count: i64,
}

/// Server-authoritative notification reconciliation engine.
pub struct NotificationReconciler {
    profiles: Arc<dyn ProfileStore>,
    recipes: Arc<dyn RecipeStore>,
    notifications: Arc<dyn NotificationStore>,
    /// Per-key locks serializing reconciliation of the same slot.
    locks: DashMap<ReconcileKey, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for NotificationReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationReconciler")
            .field("active_keys", &self.locks.len())
            .finish()
    }
}

impl NotificationReconciler {
    /// Creates a new reconciler over the given stores.
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        recipes: Arc<dyn RecipeStore>,
        notifications: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            profiles,
            recipes,
            notifications,
            locks: DashMap::new(),
        }
    }

    /// A like was applied to a recipe.
    ///
    /// Returns `Ok(None)` when no notification is due (self-like, or the
    /// slot was already PRESENT). Lookup failures abort with an error and
    /// leave no partial writes.
    pub async fn like_applied(
        &self,
        recipe_id: Uuid,
        sender_id: Uuid,
    ) -> AppResult<Option<NotificationDelivery>> {
        let (recipe, sender) = self.resolve(recipe_id, sender_id).await?;
        let recipient_id = recipe.author_id;

        if recipient_id == sender_id {
            debug!(recipe_id = %recipe_id, "Self-like, no notification");
            return Ok(None);
        }

        let key = ReconcileKey {
            recipient: UserId::from(recipient_id),
            sender: UserId::from(sender_id),
            recipe: RecipeId::from(recipe_id),
            kind: NotificationKind::Like,
        };
        let _guard = self.lock_key(key).await;

        let message = format!("{} liked your recipe \"{}\"", sender.visible_name(), recipe.title);
        let created = self
            .notifications
            .create_like_if_absent(recipient_id, sender_id, recipe_id, &message)
            .await?;

        let result = match created {
            Some(notification) => {
                let unread_count = self.notifications.count_unread(recipient_id).await?;
                Ok(Some(NotificationDelivery {
                    notification,
                    sender,
                    recipe,
                    unread_count,
                }))
            }
            None => {
                debug!(recipe_id = %recipe_id, sender_id = %sender_id, "Duplicate like, no-op");
                Ok(None)
            }
        };

        drop(_guard);
        self.release_key(key);
        result
    }

    /// A like was removed from a recipe.
    ///
    /// Deletes every like notification for the triple (defends against
    /// stray duplicates) and returns the removal descriptor, or `Ok(None)`
    /// when nothing was stored (self-like, unknown recipe already gone).
    pub async fn like_removed(
        &self,
        recipe_id: Uuid,
        sender_id: Uuid,
    ) -> AppResult<Option<NotificationRemoval>> {
        let recipe = self
            .recipes
            .recipe_head(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {recipe_id} not found")))?;
        let recipient_id = recipe.author_id;

        if recipient_id == sender_id {
            return Ok(None);
        }

        let key = ReconcileKey {
            recipient: UserId::from(recipient_id),
            sender: UserId::from(sender_id),
            recipe: RecipeId::from(recipe_id),
            kind: NotificationKind::Like,
        };
        let _guard = self.lock_key(key).await;

        let removed = self
            .notifications
            .delete_matching(recipient_id, sender_id, recipe_id, NotificationKind::Like)
            .await?;

        let result = if removed == 0 {
            Ok(None)
        } else {
            let unread_count = self.notifications.count_unread(recipient_id).await?;
            Ok(Some(NotificationRemoval {
                recipient_id,
                sender_id,
                recipe_id,
                kind: NotificationKind::Like,
                unread_count,
            }))
        };

        drop(_guard);
        self.release_key(key);
        result
    }

    /// A comment was posted. Additive: every comment notifies the owner,
    /// except comments on one's own recipe.
    pub async fn comment_posted(
        &self,
        recipe_id: Uuid,
        sender_id: Uuid,
    ) -> AppResult<Option<NotificationDelivery>> {
        self.additive(recipe_id, sender_id, NotificationKind::Comment)
            .await
    }

    /// A rating was submitted. Additive, same suppression rule as comments.
    pub async fn rating_posted(
        &self,
        recipe_id: Uuid,
        sender_id: Uuid,
    ) -> AppResult<Option<NotificationDelivery>> {
        self.additive(recipe_id, sender_id, NotificationKind::Rating)
            .await
    }

    async fn additive(
        &self,
        recipe_id: Uuid,
        sender_id: Uuid,
        kind: NotificationKind,
    ) -> AppResult<Option<NotificationDelivery>> {
        let (recipe, sender) = self.resolve(recipe_id, sender_id).await?;
        let recipient_id = recipe.author_id;

        if recipient_id == sender_id {
            debug!(recipe_id = %recipe_id, kind = %kind, "Self-action, no notification");
            return Ok(None);
        }

        let message = match kind {
            NotificationKind::Comment => format!(
                "{} commented on your recipe \"{}\"",
                sender.visible_name(),
                recipe.title
            ),
            NotificationKind::Rating => format!(
                "{} rated your recipe \"{}\"",
                sender.visible_name(),
                recipe.title
            ),
            other => {
                return Err(AppError::internal(format!(
                    "Kind {other} is not additive"
                )));
            }
        };

        let notification = self
            .notifications
            .create(recipient_id, sender_id, Some(recipe_id), kind, &message)
            .await?;
        let unread_count = self.notifications.count_unread(recipient_id).await?;

        Ok(Some(NotificationDelivery {
            notification,
            sender,
            recipe,
            unread_count,
        }))
    }

    /// Resolve the recipe head and sender profile, aborting on either miss
    /// before any write happens.
    async fn resolve(&self, recipe_id: Uuid, sender_id: Uuid) -> AppResult<(RecipeHead, UserBrief)> {
        let recipe = self
            .recipes
            .recipe_head(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {recipe_id} not found")))?;
        let sender = self
            .profiles
            .user_brief(sender_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {sender_id} not found")))?;
        Ok((recipe, sender))
    }

    /// Acquire the per-key mutex, cloning the `Arc` out of the map so the
    /// map shard lock is not held across the await.
    async fn lock_key(&self, key: ReconcileKey) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop the lock entry once no other task holds it.
    fn release_key(&self, key: ReconcileKey) {
        self.locks
            .remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;

    /// In-memory store backing all three seams for reconciler tests.
    #[derive(Default)]
    struct MemoryStore {
        users: StdMutex<HashMap<Uuid, UserBrief>>,
        recipes: StdMutex<HashMap<Uuid, RecipeHead>>,
        notifications: StdMutex<Vec<Notification>>,
    }

    impl MemoryStore {
        fn add_user(&self, name: &str) -> Uuid {
            let id = Uuid::new_v4();
            self.users.lock().unwrap().insert(
                id,
                UserBrief {
                    id,
                    username: name.to_string(),
                    display_name: None,
                    avatar_url: None,
                },
            );
            id
        }

        fn add_recipe(&self, author_id: Uuid, title: &str) -> Uuid {
            let id = Uuid::new_v4();
            self.recipes.lock().unwrap().insert(
                id,
                RecipeHead {
                    id,
                    author_id,
                    title: title.to_string(),
                },
            );
            id
        }

        fn rows_matching(
            &self,
            recipient: Uuid,
            sender: Uuid,
            recipe: Uuid,
            kind: NotificationKind,
        ) -> usize {
            self.notifications
                .lock()
                .unwrap()
                .iter()
                .filter(|n| {
                    n.recipient_id == recipient
                        && n.sender_id == sender
                        && n.recipe_id == Some(recipe)
                        && n.kind == kind
                })
                .count()
        }
    }

    #[async_trait]
    impl ProfileStore for MemoryStore {
        async fn user_brief(&self, user_id: Uuid) -> AppResult<Option<UserBrief>> {
            Ok(self.users.lock().unwrap().get(&user_id).cloned())
        }
    }

    #[async_trait]
    impl RecipeStore for MemoryStore {
        async fn recipe_head(&self, recipe_id: Uuid) -> AppResult<Option<RecipeHead>> {
            Ok(self.recipes.lock().unwrap().get(&recipe_id).cloned())
        }
    }

    #[async_trait]
    impl NotificationStore for MemoryStore {
        async fn create(
            &self,
            recipient_id: Uuid,
            sender_id: Uuid,
            recipe_id: Option<Uuid>,
            kind: NotificationKind,
            message: &str,
        ) -> AppResult<Notification> {
            let notification = Notification {
                id: Uuid::new_v4(),
                recipient_id,
                sender_id,
                recipe_id,
                kind,
                message: message.to_string(),
                is_read: false,
                created_at: Utc::now(),
            };
            self.notifications.lock().unwrap().push(notification.clone());
            Ok(notification)
        }

        async fn create_like_if_absent(
            &self,
            recipient_id: Uuid,
            sender_id: Uuid,
            recipe_id: Uuid,
            message: &str,
        ) -> AppResult<Option<Notification>> {
            let mut rows = self.notifications.lock().unwrap();
            let exists = rows.iter().any(|n| {
                n.recipient_id == recipient_id
                    && n.sender_id == sender_id
                    && n.recipe_id == Some(recipe_id)
                    && n.kind == NotificationKind::Like
            });
            if exists {
                return Ok(None);
            }
            let notification = Notification {
                id: Uuid::new_v4(),
                recipient_id,
                sender_id,
                recipe_id: Some(recipe_id),
                kind: NotificationKind::Like,
                message: message.to_string(),
                is_read: false,
                created_at: Utc::now(),
            };
            rows.push(notification.clone());
            Ok(Some(notification))
        }

        async fn delete_matching(
            &self,
            recipient_id: Uuid,
            sender_id: Uuid,
            recipe_id: Uuid,
            kind: NotificationKind,
        ) -> AppResult<u64> {
            let mut rows = self.notifications.lock().unwrap();
            let before = rows.len();
            rows.retain(|n| {
                !(n.recipient_id == recipient_id
                    && n.sender_id == sender_id
                    && n.recipe_id == Some(recipe_id)
                    && n.kind == kind)
            });
            Ok((before - rows.len()) as u64)
        }

        async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
            Ok(self
                .notifications
                .lock()
                .unwrap()
                .iter()
                .filter(|n| n.recipient_id == user_id && !n.is_read)
                .count() as i64)
        }
    }

    fn reconciler(store: &Arc<MemoryStore>) -> NotificationReconciler {
        NotificationReconciler::new(store.clone(), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_like_creates_single_notification() {
        let store = Arc::new(MemoryStore::default());
        let owner = store.add_user("owner");
        let liker = store.add_user("liker");
        let recipe = store.add_recipe(owner, "Shakshuka");
        let engine = reconciler(&store);

        let delivery = engine.like_applied(recipe, liker).await.unwrap().unwrap();
        assert_eq!(delivery.notification.recipient_id, owner);
        assert_eq!(delivery.notification.sender_id, liker);
        assert_eq!(delivery.notification.kind, NotificationKind::Like);
        assert_eq!(delivery.unread_count, 1);
        assert!(delivery.notification.message.contains("Shakshuka"));
        assert_eq!(store.rows_matching(owner, liker, recipe, NotificationKind::Like), 1);
    }

    #[tokio::test]
    async fn test_duplicate_like_is_noop() {
        let store = Arc::new(MemoryStore::default());
        let owner = store.add_user("owner");
        let liker = store.add_user("liker");
        let recipe = store.add_recipe(owner, "Shakshuka");
        let engine = reconciler(&store);

        assert!(engine.like_applied(recipe, liker).await.unwrap().is_some());
        assert!(engine.like_applied(recipe, liker).await.unwrap().is_none());
        assert_eq!(store.rows_matching(owner, liker, recipe, NotificationKind::Like), 1);
    }

    #[tokio::test]
    async fn test_like_then_unlike_leaves_no_rows() {
        let store = Arc::new(MemoryStore::default());
        let owner = store.add_user("owner");
        let liker = store.add_user("liker");
        let recipe = store.add_recipe(owner, "Shakshuka");
        let engine = reconciler(&store);

        engine.like_applied(recipe, liker).await.unwrap();
        let removal = engine.like_removed(recipe, liker).await.unwrap().unwrap();
        assert_eq!(removal.recipient_id, owner);
        assert_eq!(removal.sender_id, liker);
        assert_eq!(removal.unread_count, 0);
        assert_eq!(store.rows_matching(owner, liker, recipe, NotificationKind::Like), 0);
    }

    #[tokio::test]
    async fn test_unlike_without_like_is_noop() {
        let store = Arc::new(MemoryStore::default());
        let owner = store.add_user("owner");
        let liker = store.add_user("liker");
        let recipe = store.add_recipe(owner, "Shakshuka");
        let engine = reconciler(&store);

        assert!(engine.like_removed(recipe, liker).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_self_like_suppressed() {
        let store = Arc::new(MemoryStore::default());
        let owner = store.add_user("owner");
        let recipe = store.add_recipe(owner, "Shakshuka");
        let engine = reconciler(&store);

        assert!(engine.like_applied(recipe, owner).await.unwrap().is_none());
        assert_eq!(store.rows_matching(owner, owner, recipe, NotificationKind::Like), 0);
    }

    #[tokio::test]
    async fn test_self_comment_suppressed() {
        let store = Arc::new(MemoryStore::default());
        let owner = store.add_user("owner");
        let recipe = store.add_recipe(owner, "Shakshuka");
        let engine = reconciler(&store);

        assert!(engine.comment_posted(recipe, owner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_comments_accumulate() {
        let store = Arc::new(MemoryStore::default());
        let owner = store.add_user("owner");
        let commenter = store.add_user("commenter");
        let recipe = store.add_recipe(owner, "Shakshuka");
        let engine = reconciler(&store);

        engine.comment_posted(recipe, commenter).await.unwrap();
        let second = engine.comment_posted(recipe, commenter).await.unwrap().unwrap();
        assert_eq!(second.unread_count, 2);
        assert_eq!(
            store.rows_matching(owner, commenter, recipe, NotificationKind::Comment),
            2
        );
    }

    #[tokio::test]
    async fn test_unknown_recipe_aborts_without_writes() {
        let store = Arc::new(MemoryStore::default());
        let liker = store.add_user("liker");
        let engine = reconciler(&store);

        let err = engine.like_applied(Uuid::new_v4(), liker).await.unwrap_err();
        assert_eq!(err.kind, recipehub_core::error::ErrorKind::NotFound);
        assert!(store.notifications.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_likes_create_one_row() {
        let store = Arc::new(MemoryStore::default());
        let owner = store.add_user("owner");
        let liker = store.add_user("liker");
        let recipe = store.add_recipe(owner, "Shakshuka");
        let engine = Arc::new(reconciler(&store));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine.like_applied(recipe, liker).await
            }));
        }
        let mut delivered = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_some() {
                delivered += 1;
            }
        }

        assert_eq!(delivered, 1);
        assert_eq!(store.rows_matching(owner, liker, recipe, NotificationKind::Like), 1);
    }
}
