//! Repository for the `notifications` table.

use roofdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::{CreateNotification, Notification};

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, user_id, notification_type, title, message, project_id, project_name, \
    is_read, read_at, created_at";

/// Provides CRUD operations for notifications. Every write is scoped to the
/// owning user.
pub struct NotificationRepo;

impl NotificationRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications
                (user_id, notification_type, title, message, project_id, project_name)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(input.user_id)
            .bind(&input.notification_type)
            .bind(&input.title)
            .bind(&input.message)
            .bind(input.project_id)
            .bind(&input.project_name)
            .fetch_one(pool)
            .await
    }

    /// List notifications for a user, newest first.
    ///
    /// When `unread_only` is `true`, only notifications with `is_read = false`
    /// are returned.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if unread_only {
            "AND is_read = false"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 {filter} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a single notification as read.
    ///
    /// Returns `true` if the notification was found for the given user and
    /// updated, `false` otherwise.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND is_read = false",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all unread notifications as read. Returns how many changed.
    pub async fn mark_all_read(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Delete one notification owned by `user_id`.
    pub async fn delete(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(notification_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Bulk delete a user's notifications, optionally only the read ones.
    pub async fn delete_all_for_user(
        pool: &PgPool,
        user_id: DbId,
        read_only: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM notifications WHERE user_id = $1 AND (NOT $2 OR is_read = true)",
        )
        .bind(user_id)
        .bind(read_only)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
