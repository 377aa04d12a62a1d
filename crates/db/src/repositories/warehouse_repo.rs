//! Repository for the `warehouses` table.

use roofdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::warehouse::{CreateWarehouse, UpdateWarehouse, Warehouse};

const COLUMNS: &str = "id, name, address, capacity, owner_id, is_active, created_at, updated_at";

/// Provides CRUD operations for warehouses. Deletion only deactivates.
pub struct WarehouseRepo;

impl WarehouseRepo {
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateWarehouse,
    ) -> Result<Warehouse, sqlx::Error> {
        let query = format!(
            "INSERT INTO warehouses (name, address, capacity, owner_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Warehouse>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .bind(input.capacity)
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// Find an active warehouse by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Warehouse>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM warehouses WHERE id = $1 AND is_active = true");
        sqlx::query_as::<_, Warehouse>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active warehouses, optionally restricted to one owner.
    pub async fn list(
        pool: &PgPool,
        owner_id: Option<DbId>,
    ) -> Result<Vec<Warehouse>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM warehouses
             WHERE is_active = true AND ($1::BIGINT IS NULL OR owner_id = $1)
             ORDER BY name"
        );
        sqlx::query_as::<_, Warehouse>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWarehouse,
    ) -> Result<Option<Warehouse>, sqlx::Error> {
        let query = format!(
            "UPDATE warehouses SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                capacity = COALESCE($4, capacity),
                updated_at = NOW()
             WHERE id = $1 AND is_active = true
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Warehouse>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(input.capacity)
            .fetch_optional(pool)
            .await
    }

    /// Deactivate a warehouse. Returns `true` if an active row was changed.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE warehouses SET is_active = false, updated_at = NOW()
             WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
