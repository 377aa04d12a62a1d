//! Repository for the append-only `activities` table.

use roofdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity::{Activity, CreateActivity};

const COLUMNS: &str = "id, user_id, activity_type, description, metadata, created_at";

/// Inserts and lists activity rows. There is no update or delete.
pub struct ActivityRepo;

impl ActivityRepo {
    pub async fn create(pool: &PgPool, input: &CreateActivity) -> Result<Activity, sqlx::Error> {
        let query = format!(
            "INSERT INTO activities (user_id, activity_type, description, metadata)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(input.user_id)
            .bind(&input.activity_type)
            .bind(&input.description)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    /// A user's activity, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Activity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activities
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
