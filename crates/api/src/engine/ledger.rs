//! Material ledger moves: reserve, consume and return.
//!
//! Reservation only writes ledger lines. Consumption and return change
//! stock, so they lock the project's lines and run in one transaction; a
//! guarded decrement that misses aborts the whole move.

use std::collections::BTreeSet;

use roofdesk_core::error::CoreError;
use roofdesk_core::materials::{
    check_sufficiency, ensure_sufficient, merge_required, stock_delta, LineStatus,
    MaterialShortage, RequiredMaterial, StockLevel,
};
use roofdesk_core::types::DbId;
use roofdesk_db::models::project_material::{ProjectMaterial, ReserveLine};
use roofdesk_db::models::warehouse::StockLevelRow;
use roofdesk_db::repositories::{ProjectMaterialRepo, WarehouseMaterialRepo, WarehouseRepo};
use sqlx::PgConnection;

use crate::error::{not_found, AppError, AppResult};
use crate::state::AppState;

async fn stock_rows(
    state: &AppState,
    warehouse_id: DbId,
    required: &[RequiredMaterial],
) -> AppResult<Vec<StockLevelRow>> {
    WarehouseRepo::find_by_id(&state.pool, warehouse_id)
        .await?
        .ok_or_else(|| not_found("Warehouse", warehouse_id))?;

    let material_ids: Vec<DbId> = required.iter().map(|r| r.material_id).collect();
    Ok(WarehouseMaterialRepo::stock_levels(&state.pool, warehouse_id, &material_ids).await?)
}

/// Shortages of `required` at a warehouse. Empty when everything is in stock.
pub async fn shortages(
    state: &AppState,
    warehouse_id: DbId,
    required: &[RequiredMaterial],
) -> AppResult<Vec<MaterialShortage>> {
    let rows = stock_rows(state, warehouse_id, required).await?;
    let levels: Vec<StockLevel> = rows.iter().map(StockLevelRow::to_level).collect();
    Ok(check_sufficiency(required, &levels)?)
}

/// Check stock, then reserve `required` for a project.
///
/// Fails with `InsufficientMaterials` before anything is written. The check
/// and the insert are separate round trips, so two reservations racing for
/// the same scarce stock can both pass.
pub async fn reserve(
    state: &AppState,
    project_id: DbId,
    warehouse_id: DbId,
    required: &[RequiredMaterial],
) -> AppResult<Vec<ProjectMaterial>> {
    let required = merge_required(required)?;
    if required.is_empty() {
        return Ok(Vec::new());
    }

    let rows = stock_rows(state, warehouse_id, &required).await?;
    let levels: Vec<StockLevel> = rows.iter().map(StockLevelRow::to_level).collect();
    ensure_sufficient(&required, &levels)?;

    let lines: Vec<ReserveLine> = required
        .iter()
        .filter_map(|req| {
            rows.iter()
                .find(|row| row.material_id == req.material_id)
                .map(|row| ReserveLine {
                    warehouse_material_id: row.warehouse_material_id,
                    quantity: req.quantity,
                })
        })
        .collect();

    let reserved = ProjectMaterialRepo::reserve(&state.pool, project_id, &lines)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "A requested material has already been consumed by this project".into(),
            ))
        })?;

    tracing::info!(
        project_id,
        warehouse_id,
        lines = reserved.len(),
        "Reserved project materials"
    );
    Ok(reserved)
}

/// Consume every reserved line of a project, taking the units out of stock.
pub async fn consume(state: &AppState, project_id: DbId) -> AppResult<Vec<ProjectMaterial>> {
    let mut tx = state.pool.begin().await?;

    let lines =
        ProjectMaterialRepo::lock_for_project(&mut tx, project_id, &[LineStatus::Reserved], None)
            .await?;

    let mut consumed = Vec::with_capacity(lines.len());
    for line in &lines {
        consumed.push(move_line(&mut tx, line, LineStatus::Consumed, None).await?);
    }

    tx.commit().await?;

    if !consumed.is_empty() {
        tracing::info!(project_id, lines = consumed.len(), "Consumed project materials");
    }
    Ok(consumed)
}

/// Return reserved or consumed lines of a project.
///
/// With `line_ids` only those lines are returned, and every one of them must
/// be returnable. Consumed units go back into stock; reserved ones never
/// left it.
pub async fn return_lines(
    state: &AppState,
    project_id: DbId,
    reason: &str,
    line_ids: Option<&[DbId]>,
) -> AppResult<Vec<ProjectMaterial>> {
    let mut tx = state.pool.begin().await?;

    let lines = ProjectMaterialRepo::lock_for_project(
        &mut tx,
        project_id,
        &[LineStatus::Reserved, LineStatus::Consumed],
        line_ids,
    )
    .await?;

    if let Some(ids) = line_ids {
        let wanted: BTreeSet<DbId> = ids.iter().copied().collect();
        if lines.len() != wanted.len() {
            return Err(AppError::Core(CoreError::Conflict(
                "Some requested lines do not exist or were already returned".into(),
            )));
        }
    }
    if lines.is_empty() {
        return Err(AppError::Core(CoreError::Conflict(
            "No reserved or consumed materials to return".into(),
        )));
    }

    let mut returned = Vec::with_capacity(lines.len());
    for line in &lines {
        returned.push(move_line(&mut tx, line, LineStatus::Returned, Some(reason)).await?);
    }

    tx.commit().await?;

    tracing::info!(project_id, lines = returned.len(), reason, "Returned project materials");
    Ok(returned)
}

/// Move one locked line and apply its stock effect.
async fn move_line(
    conn: &mut PgConnection,
    line: &ProjectMaterial,
    to: LineStatus,
    reason: Option<&str>,
) -> AppResult<ProjectMaterial> {
    let from = line.line_status().ok_or_else(|| {
        AppError::InternalError(format!(
            "Ledger line {} has unknown status '{}'",
            line.id, line.status
        ))
    })?;

    let delta = stock_delta(from, to, line.quantity)?;
    if delta != 0
        && !WarehouseMaterialRepo::adjust_quantity(&mut *conn, line.warehouse_material_id, delta)
            .await?
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Not enough stock left to consume {} unit(s) for ledger line {}",
            line.quantity, line.id
        ))));
    }

    Ok(ProjectMaterialRepo::set_status(&mut *conn, line.id, to, reason).await?)
}
