//! In-app notifications.

use roofdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub project_id: Option<DbId>,
    pub project_name: Option<String>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Insert DTO used by the notification dispatcher.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub project_id: Option<DbId>,
    pub project_name: Option<String>,
}
