//! Notification repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use recipehub_core::error::{AppError, ErrorKind};
use recipehub_core::result::AppResult;
use recipehub_core::types::pagination::{PageRequest, PageResponse};
use recipehub_entity::notification::{Notification, NotificationKind};

/// Repository for notification CRUD operations.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List notifications for a user, newest first.
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE recipient_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count notifications", e)
                })?;

        let notifs = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE recipient_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list notifications", e)
        })?;

        Ok(PageResponse::new(
            notifs,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))
    }

    /// Create a notification unconditionally (comment, rating, follow).
    pub async fn create(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
        recipe_id: Option<Uuid>,
        kind: NotificationKind,
        message: &str,
    ) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (recipient_id, sender_id, recipe_id, kind, message) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(recipient_id)
        .bind(sender_id)
        .bind(recipe_id)
        .bind(kind)
        .bind(message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create notification", e))
    }

    /// Create a like notification, ignoring the insert when a row for the
    /// (recipient, sender, recipe) triple already exists.
    ///
    /// Backed by the partial unique index on like notifications, so two
    /// racing inserts still produce exactly one row. Returns `None` when the
    /// insert was skipped as a duplicate.
    pub async fn create_like_if_absent(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
        recipe_id: Uuid,
        message: &str,
    ) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (recipient_id, sender_id, recipe_id, kind, message) \
             VALUES ($1, $2, $3, 'like', $4) \
             ON CONFLICT (recipient_id, sender_id, recipe_id, kind) WHERE kind = 'like' \
             DO NOTHING \
             RETURNING *",
        )
        .bind(recipient_id)
        .bind(sender_id)
        .bind(recipe_id)
        .bind(message)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create like notification", e)
        })
    }

    /// Delete every notification matching the (recipient, sender, recipe,
    /// kind) key. Returns the number of rows removed — more than one means a
    /// duplicate had slipped in and is cleaned up here.
    pub async fn delete_matching(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
        recipe_id: Uuid,
        kind: NotificationKind,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM notifications \
             WHERE recipient_id = $1 AND sender_id = $2 AND recipe_id = $3 AND kind = $4",
        )
        .bind(recipient_id)
        .bind(sender_id)
        .bind(recipe_id)
        .bind(kind)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete notifications", e)
        })?;
        Ok(result.rows_affected())
    }

    /// Mark a notification as read.
    pub async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND recipient_id = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))?;
        Ok(())
    }

    /// Mark all notifications as read for a user.
    pub async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE \
             WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }

    /// Delete notifications older than the given timestamp.
    pub async fn cleanup_old(&self, before: chrono::DateTime<chrono::Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE created_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to cleanup notifications", e)
            })?;
        Ok(result.rows_affected())
    }
}
