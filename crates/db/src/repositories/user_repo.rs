//! Repository for the `users` table.

use roofdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

const COLUMNS: &str = "id, name, email, password_hash, role, is_active, created_at, updated_at";

/// Provides lookups and inserts for user accounts.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user. A duplicate email violates `uq_users_email`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, role)
             VALUES ($1, LOWER($2), $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Case-insensitive email lookup.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = LOWER($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Active users holding `role`, ordered by name.
    pub async fn list_by_role(pool: &PgPool, role: &str) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE role = $1 AND is_active = true ORDER BY name"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(role)
            .fetch_all(pool)
            .await
    }
}
