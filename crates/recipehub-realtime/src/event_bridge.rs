//! Domain action → fan-out mapping.
//!
//! Runs the primary mutation for each recipe interaction, then reconciles
//! notification state and fans the resulting events out to the affected
//! rooms. Only the primary mutation reports failure to the acting user;
//! notification side effects are best-effort and merely logged.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use recipehub_core::result::AppResult;
use recipehub_service::context::RequestContext;
use recipehub_service::notification::reconciler::{
    NotificationDelivery, NotificationReconciler, NotificationRemoval,
};
use recipehub_service::recipe::service::{LikeChange, RecipeService};

use crate::fanout::FanoutEngine;
use crate::message::{RecipeRef, ServerMessage};
use crate::room::types::RoomId;

/// Bridges recipe interactions into the realtime system.
pub struct EventBridge {
    /// Primary mutation services.
    recipes: Arc<RecipeService>,
    /// Notification reconciliation engine.
    reconciler: Arc<NotificationReconciler>,
    /// Room fan-out engine.
    fanout: Arc<FanoutEngine>,
}

impl std::fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBridge").finish()
    }
}

impl EventBridge {
    /// Create a new event bridge.
    pub fn new(
        recipes: Arc<RecipeService>,
        reconciler: Arc<NotificationReconciler>,
        fanout: Arc<FanoutEngine>,
    ) -> Self {
        Self {
            recipes,
            reconciler,
            fanout,
        }
    }

    /// Handle a like toggle.
    ///
    /// Errors from the like write itself propagate to the caller; the
    /// notification side is fire-and-forget.
    pub async fn on_like(
        &self,
        ctx: &RequestContext,
        recipe_id: Uuid,
        is_liked: bool,
    ) -> AppResult<()> {
        let change = self.recipes.set_like(ctx, recipe_id, is_liked).await?;

        match change {
            LikeChange::Applied => match self.reconciler.like_applied(recipe_id, ctx.user_id).await
            {
                Ok(Some(delivery)) => self.emit_notification(delivery).await,
                Ok(None) => {}
                Err(e) => warn!(recipe_id = %recipe_id, error = %e, "Like notification skipped"),
            },
            LikeChange::Removed => match self.reconciler.like_removed(recipe_id, ctx.user_id).await
            {
                Ok(Some(removal)) => self.emit_removal(removal).await,
                Ok(None) => {}
                Err(e) => warn!(recipe_id = %recipe_id, error = %e, "Unlike notification skipped"),
            },
            // The stored state already matched; a duplicate toggle event
            // must not touch notifications.
            LikeChange::Unchanged => {}
        }

        Ok(())
    }

    /// Handle a new comment: persist, fan out to the recipe room, and
    /// conditionally notify the owner.
    pub async fn on_comment(
        &self,
        ctx: &RequestContext,
        recipe_id: Uuid,
        comment_text: &str,
    ) -> AppResult<()> {
        let comment = self.recipes.add_comment(ctx, recipe_id, comment_text).await?;

        self.fanout
            .broadcast(
                &RoomId::recipe(recipe_id),
                &ServerMessage::CommentAdded { comment },
            )
            .await;

        match self.reconciler.comment_posted(recipe_id, ctx.user_id).await {
            Ok(Some(delivery)) => self.emit_notification(delivery).await,
            Ok(None) => {}
            Err(e) => warn!(recipe_id = %recipe_id, error = %e, "Comment notification skipped"),
        }

        Ok(())
    }

    /// Handle a rating: upsert, fan out the new aggregate to the recipe
    /// room, and conditionally notify the owner.
    pub async fn on_rating(
        &self,
        ctx: &RequestContext,
        recipe_id: Uuid,
        rating: i16,
    ) -> AppResult<()> {
        let summary = self.recipes.rate_recipe(ctx, recipe_id, rating).await?;

        self.fanout
            .broadcast(
                &RoomId::recipe(recipe_id),
                &ServerMessage::RatingUpdated {
                    recipe_id,
                    average_rating: summary.average_rating,
                    total_ratings: summary.total_ratings,
                },
            )
            .await;

        match self.reconciler.rating_posted(recipe_id, ctx.user_id).await {
            Ok(Some(delivery)) => self.emit_notification(delivery).await,
            Ok(None) => {}
            Err(e) => warn!(recipe_id = %recipe_id, error = %e, "Rating notification skipped"),
        }

        Ok(())
    }

    /// Emits `new-notification` plus the refreshed unread count to the
    /// recipient's personal room.
    async fn emit_notification(&self, delivery: NotificationDelivery) {
        let recipient_id = delivery.notification.recipient_id;
        let message = ServerMessage::new_notification(
            &delivery.notification,
            delivery.sender,
            Some(RecipeRef::from(&delivery.recipe)),
        );
        self.fanout
            .broadcast(&RoomId::user(recipient_id), &message)
            .await;
        self.fanout
            .push_unread_count(recipient_id, delivery.unread_count)
            .await;
    }

    /// Emits `notification-removed` plus the refreshed unread count.
    async fn emit_removal(&self, removal: NotificationRemoval) {
        let message = ServerMessage::NotificationRemoved {
            kind: removal.kind,
            recipe_id: removal.recipe_id,
            sender_id: removal.sender_id,
            recipient_id: Some(removal.recipient_id),
        };
        self.fanout
            .broadcast(&RoomId::user(removal.recipient_id), &message)
            .await;
        self.fanout
            .push_unread_count(removal.recipient_id, removal.unread_count)
            .await;
    }
}
