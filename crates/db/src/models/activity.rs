//! Append-only activity log.

use roofdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `activities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Activity {
    pub id: DbId,
    pub user_id: DbId,
    pub activity_type: String,
    pub description: String,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateActivity {
    pub user_id: DbId,
    pub activity_type: String,
    pub description: String,
    pub metadata: serde_json::Value,
}
