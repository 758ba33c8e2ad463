//! Narrow store seams consumed by the notification reconciler.
//!
//! The reconciler only needs owner/profile lookups and the notification
//! mutations, so it depends on these traits rather than on the concrete
//! repositories. The sqlx repositories implement them below; tests use
//! in-memory fakes.

use async_trait::async_trait;
use uuid::Uuid;

use recipehub_core::result::AppResult;
use recipehub_database::repositories::{NotificationRepository, RecipeRepository, UserRepository};
use recipehub_entity::notification::{Notification, NotificationKind};
use recipehub_entity::recipe::RecipeHead;
use recipehub_entity::user::UserBrief;

/// Read access to user display data.
#[async_trait]
pub trait ProfileStore: Send + Sync + 'static {
    /// Fetch the brief profile for a user, `None` if absent.
    async fn user_brief(&self, user_id: Uuid) -> AppResult<Option<UserBrief>>;
}

/// Read access to recipe ownership data.
#[async_trait]
pub trait RecipeStore: Send + Sync + 'static {
    /// Fetch the owner/title head for a recipe, `None` if absent.
    async fn recipe_head(&self, recipe_id: Uuid) -> AppResult<Option<RecipeHead>>;
}

/// Notification table mutations used during reconciliation.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Insert an additive notification (comment, rating, follow).
    async fn create(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
        recipe_id: Option<Uuid>,
        kind: NotificationKind,
        message: &str,
    ) -> AppResult<Notification>;

    /// Insert a like notification unless one already exists for the triple.
    /// Returns `None` when skipped as a duplicate.
    async fn create_like_if_absent(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
        recipe_id: Uuid,
        message: &str,
    ) -> AppResult<Option<Notification>>;

    /// Delete every notification matching the key. Returns rows removed.
    async fn delete_matching(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
        recipe_id: Uuid,
        kind: NotificationKind,
    ) -> AppResult<u64>;

    /// Authoritative unread count for a user.
    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64>;
}

#[async_trait]
impl ProfileStore for UserRepository {
    async fn user_brief(&self, user_id: Uuid) -> AppResult<Option<UserBrief>> {
        self.find_brief(user_id).await
    }
}

#[async_trait]
impl RecipeStore for RecipeRepository {
    async fn recipe_head(&self, recipe_id: Uuid) -> AppResult<Option<RecipeHead>> {
        self.find_head(recipe_id).await
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn create(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
        recipe_id: Option<Uuid>,
        kind: NotificationKind,
        message: &str,
    ) -> AppResult<Notification> {
        NotificationRepository::create(self, recipient_id, sender_id, recipe_id, kind, message)
            .await
    }

    async fn create_like_if_absent(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
        recipe_id: Uuid,
        message: &str,
    ) -> AppResult<Option<Notification>> {
        NotificationRepository::create_like_if_absent(
            self,
            recipient_id,
            sender_id,
            recipe_id,
            message,
        )
        .await
    }

    async fn delete_matching(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
        recipe_id: Uuid,
        kind: NotificationKind,
    ) -> AppResult<u64> {
        NotificationRepository::delete_matching(self, recipient_id, sender_id, recipe_id, kind)
            .await
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        NotificationRepository::count_unread(self, user_id).await
    }
}
