//! Repository for `project_materials`, the reservation/consumption ledger.

use roofdesk_core::materials::LineStatus;
use roofdesk_core::types::DbId;
use roofdesk_core::workflow::RESERVING_STATUSES;
use sqlx::{PgConnection, PgPool};

use crate::models::project_material::{
    ProjectMaterial, ProjectMaterialDetail, ReservationRow, ReserveLine,
};

const COLUMNS: &str = "id, project_id, warehouse_material_id, quantity, status, return_reason, \
    reserved_at, consumed_at, returned_at, created_at, updated_at";

/// Provides ledger reads and line status writes.
pub struct ProjectMaterialRepo;

impl ProjectMaterialRepo {
    /// Ledger lines of a project with material and warehouse names.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectMaterialDetail>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMaterialDetail>(
            "SELECT pm.id, pm.project_id, pm.warehouse_material_id,
                    w.id AS warehouse_id, w.name AS warehouse_name,
                    pc.id AS material_id, pc.name AS material_name, pc.category, pc.unit_price,
                    pm.quantity, pm.status, pm.return_reason,
                    pm.reserved_at, pm.consumed_at, pm.returned_at
             FROM project_materials pm
             JOIN warehouse_materials wm ON wm.id = pm.warehouse_material_id
             JOIN warehouses w ON w.id = wm.warehouse_id
             JOIN pricing_configs pc ON pc.id = wm.material_id
             WHERE pm.project_id = $1
             ORDER BY pc.name",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Reserve stock lines for a project in one transaction.
    ///
    /// An existing reserved line for the same stock row grows by the new
    /// quantity; a returned line is reopened. Stock quantities are not
    /// touched. Returns `None` (and rolls back) if any target line has
    /// already been consumed.
    pub async fn reserve(
        pool: &PgPool,
        project_id: DbId,
        lines: &[ReserveLine],
    ) -> Result<Option<Vec<ProjectMaterial>>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO project_materials (project_id, warehouse_material_id, quantity, status)
             VALUES ($1, $2, $3, 'RESERVED')
             ON CONFLICT (project_id, warehouse_material_id) DO UPDATE SET
                quantity = CASE WHEN project_materials.status = 'RESERVED'
                                THEN project_materials.quantity + EXCLUDED.quantity
                                ELSE EXCLUDED.quantity END,
                status = 'RESERVED',
                return_reason = NULL,
                reserved_at = NOW(),
                consumed_at = NULL,
                returned_at = NULL,
                updated_at = NOW()
             WHERE project_materials.status <> 'CONSUMED'
             RETURNING {COLUMNS}"
        );

        let mut reserved = Vec::with_capacity(lines.len());
        for line in lines {
            let row = sqlx::query_as::<_, ProjectMaterial>(&query)
                .bind(project_id)
                .bind(line.warehouse_material_id)
                .bind(line.quantity)
                .fetch_optional(&mut *tx)
                .await?;
            match row {
                Some(row) => reserved.push(row),
                None => return Ok(None),
            }
        }

        tx.commit().await?;
        Ok(Some(reserved))
    }

    /// Lock a project's lines in the given statuses for update.
    ///
    /// When `line_ids` is `Some`, only those lines are considered.
    pub async fn lock_for_project(
        conn: &mut PgConnection,
        project_id: DbId,
        statuses: &[LineStatus],
        line_ids: Option<&[DbId]>,
    ) -> Result<Vec<ProjectMaterial>, sqlx::Error> {
        let statuses: Vec<&str> = statuses.iter().map(LineStatus::as_str).collect();
        let query = format!(
            "SELECT {COLUMNS} FROM project_materials
             WHERE project_id = $1 AND status = ANY($2)
               AND ($3::BIGINT[] IS NULL OR id = ANY($3))
             ORDER BY id
             FOR UPDATE"
        );
        sqlx::query_as::<_, ProjectMaterial>(&query)
            .bind(project_id)
            .bind(&statuses)
            .bind(line_ids)
            .fetch_all(&mut *conn)
            .await
    }

    /// Move one line to `to`, stamping the matching timestamp.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: DbId,
        to: LineStatus,
        reason: Option<&str>,
    ) -> Result<ProjectMaterial, sqlx::Error> {
        let query = format!(
            "UPDATE project_materials SET
                status = $2,
                consumed_at = CASE WHEN $2 = 'CONSUMED' THEN NOW() ELSE consumed_at END,
                returned_at = CASE WHEN $2 = 'RETURNED' THEN NOW() ELSE returned_at END,
                return_reason = COALESCE($3, return_reason),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectMaterial>(&query)
            .bind(id)
            .bind(to.as_str())
            .bind(reason)
            .fetch_one(&mut *conn)
            .await
    }

    /// Reserved lines of live projects in a reserving status.
    pub async fn list_active_reservations(
        pool: &PgPool,
    ) -> Result<Vec<ReservationRow>, sqlx::Error> {
        let statuses: Vec<&str> = RESERVING_STATUSES.iter().map(|s| s.as_str()).collect();
        sqlx::query_as::<_, ReservationRow>(
            "SELECT pm.warehouse_material_id, p.id AS project_id, p.name AS project_name,
                    p.status AS project_status, pm.quantity
             FROM project_materials pm
             JOIN projects p ON p.id = pm.project_id
             WHERE pm.status = 'RESERVED' AND p.deleted_at IS NULL AND p.status = ANY($1)",
        )
        .bind(&statuses)
        .fetch_all(pool)
        .await
    }
}
