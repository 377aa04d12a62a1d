//! Repository for the `pricing_configs` table.

use roofdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::pricing::{CreatePricingConfig, PricingConfig, UpdatePricingConfig};

const COLUMNS: &str = "id, name, category, unit, unit_price, length, width, height, \
    is_active, created_at, updated_at";

/// Provides CRUD operations for pricing entries. Deletion only deactivates.
pub struct PricingConfigRepo;

impl PricingConfigRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreatePricingConfig,
    ) -> Result<PricingConfig, sqlx::Error> {
        let query = format!(
            "INSERT INTO pricing_configs (name, category, unit, unit_price, length, width, height)
             VALUES ($1, $2, COALESCE($3, 'each'), $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PricingConfig>(&query)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.unit)
            .bind(input.unit_price)
            .bind(input.length)
            .bind(input.width)
            .bind(input.height)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PricingConfig>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pricing_configs WHERE id = $1");
        sqlx::query_as::<_, PricingConfig>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active entries ordered by category, then name.
    pub async fn list(pool: &PgPool) -> Result<Vec<PricingConfig>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pricing_configs WHERE is_active = true ORDER BY category, name"
        );
        sqlx::query_as::<_, PricingConfig>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePricingConfig,
    ) -> Result<Option<PricingConfig>, sqlx::Error> {
        let query = format!(
            "UPDATE pricing_configs SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                unit = COALESCE($4, unit),
                unit_price = COALESCE($5, unit_price),
                length = COALESCE($6, length),
                width = COALESCE($7, width),
                height = COALESCE($8, height),
                updated_at = NOW()
             WHERE id = $1 AND is_active = true
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PricingConfig>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.unit)
            .bind(input.unit_price)
            .bind(input.length)
            .bind(input.width)
            .bind(input.height)
            .fetch_optional(pool)
            .await
    }

    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE pricing_configs SET is_active = false, updated_at = NOW()
             WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
