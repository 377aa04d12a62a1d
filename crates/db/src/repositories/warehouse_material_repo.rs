//! Repository for `warehouse_materials`, the per-warehouse stock rows.

use roofdesk_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::warehouse::{
    AddWarehouseMaterial, StockLevelRow, StockLineRow, StockedMaterial, WarehouseMaterial,
};

const COLUMNS: &str = "id, warehouse_id, material_id, quantity, is_active, created_at, updated_at";

/// Columns of [`StockedMaterial`], aliased over `wm` and `pc`.
const STOCKED_COLUMNS: &str = "wm.id, wm.warehouse_id, wm.material_id, \
    pc.name AS material_name, pc.category, pc.unit, pc.unit_price, pc.length, pc.width, \
    pc.height, wm.quantity, wm.updated_at";

/// Provides stock reads and quantity writes.
pub struct WarehouseMaterialRepo;

impl WarehouseMaterialRepo {
    /// Stock a new material at a warehouse.
    ///
    /// A second row for the same pair violates
    /// `uq_warehouse_materials_warehouse_material`.
    pub async fn add(
        pool: &PgPool,
        warehouse_id: DbId,
        input: &AddWarehouseMaterial,
    ) -> Result<WarehouseMaterial, sqlx::Error> {
        let query = format!(
            "INSERT INTO warehouse_materials (warehouse_id, material_id, quantity)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarehouseMaterial>(&query)
            .bind(warehouse_id)
            .bind(input.material_id)
            .bind(input.quantity)
            .fetch_one(pool)
            .await
    }

    /// Active materials of a warehouse, joined with pricing, by name.
    pub async fn list_for_warehouse(
        pool: &PgPool,
        warehouse_id: DbId,
    ) -> Result<Vec<StockedMaterial>, sqlx::Error> {
        let query = format!(
            "SELECT {STOCKED_COLUMNS}
             FROM warehouse_materials wm
             JOIN pricing_configs pc ON pc.id = wm.material_id
             WHERE wm.warehouse_id = $1 AND wm.is_active = true
             ORDER BY pc.name"
        );
        sqlx::query_as::<_, StockedMaterial>(&query)
            .bind(warehouse_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_stocked(
        pool: &PgPool,
        warehouse_id: DbId,
        material_id: DbId,
    ) -> Result<Option<StockedMaterial>, sqlx::Error> {
        let query = format!(
            "SELECT {STOCKED_COLUMNS}
             FROM warehouse_materials wm
             JOIN pricing_configs pc ON pc.id = wm.material_id
             WHERE wm.warehouse_id = $1 AND wm.material_id = $2 AND wm.is_active = true"
        );
        sqlx::query_as::<_, StockedMaterial>(&query)
            .bind(warehouse_id)
            .bind(material_id)
            .fetch_optional(pool)
            .await
    }

    /// Current quantities of the given materials at one warehouse.
    ///
    /// Materials the warehouse does not stock are simply absent.
    pub async fn stock_levels(
        pool: &PgPool,
        warehouse_id: DbId,
        material_ids: &[DbId],
    ) -> Result<Vec<StockLevelRow>, sqlx::Error> {
        sqlx::query_as::<_, StockLevelRow>(
            "SELECT wm.id AS warehouse_material_id, wm.material_id,
                    pc.name AS material_name, wm.quantity
             FROM warehouse_materials wm
             JOIN pricing_configs pc ON pc.id = wm.material_id
             WHERE wm.warehouse_id = $1 AND wm.material_id = ANY($2) AND wm.is_active = true",
        )
        .bind(warehouse_id)
        .bind(material_ids)
        .fetch_all(pool)
        .await
    }

    /// Every active stock line in every active warehouse.
    pub async fn list_active_stock_lines(pool: &PgPool) -> Result<Vec<StockLineRow>, sqlx::Error> {
        sqlx::query_as::<_, StockLineRow>(
            "SELECT wm.id AS warehouse_material_id, w.id AS warehouse_id, w.name AS warehouse_name,
                    pc.id AS material_id, pc.name AS material_name, pc.category, wm.quantity
             FROM warehouse_materials wm
             JOIN warehouses w ON w.id = wm.warehouse_id
             JOIN pricing_configs pc ON pc.id = wm.material_id
             WHERE wm.is_active = true AND w.is_active = true",
        )
        .fetch_all(pool)
        .await
    }

    /// Overwrite the on-hand quantity. Returns `None` if the row is absent.
    pub async fn set_quantity(
        pool: &PgPool,
        warehouse_id: DbId,
        material_id: DbId,
        quantity: i32,
    ) -> Result<Option<WarehouseMaterial>, sqlx::Error> {
        let query = format!(
            "UPDATE warehouse_materials SET quantity = $3, updated_at = NOW()
             WHERE warehouse_id = $1 AND material_id = $2 AND is_active = true
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarehouseMaterial>(&query)
            .bind(warehouse_id)
            .bind(material_id)
            .bind(quantity)
            .fetch_optional(pool)
            .await
    }

    /// Add `delta` units to a stock row.
    ///
    /// The update is guarded so the quantity never drops below zero:
    /// returns `false` when the row is missing or holds fewer than `-delta`
    /// units. Runs on the caller's connection so it can join a transaction.
    pub async fn adjust_quantity(
        conn: &mut PgConnection,
        id: DbId,
        delta: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE warehouse_materials SET quantity = quantity + $2, updated_at = NOW()
             WHERE id = $1 AND quantity + $2 >= 0",
        )
        .bind(id)
        .bind(delta)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WarehouseMaterial>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM warehouse_materials WHERE id = $1");
        sqlx::query_as::<_, WarehouseMaterial>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
