//! Low-stock warnings across warehouses.

use std::collections::HashSet;

use axum::extract::State;
use axum::Json;
use roofdesk_core::materials::{scan_low_stock, ProjectReservation, StockLine, StockWarning};
use roofdesk_core::types::DbId;
use roofdesk_db::models::project_material::ReservationRow;
use roofdesk_db::repositories::{ProjectMaterialRepo, WarehouseMaterialRepo, WarehouseRepo};

use crate::error::AppResult;
use crate::middleware::rbac::RequireInventoryManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/inventory/warnings
///
/// Stock lines at or below their category thresholds, with the projects
/// holding reservations on them. Admins see their own warehouses only.
pub async fn list_warnings(
    RequireInventoryManager(user): RequireInventoryManager,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<StockWarning>>>> {
    let mut lines: Vec<StockLine> = WarehouseMaterialRepo::list_active_stock_lines(&state.pool)
        .await?
        .into_iter()
        .map(StockLine::from)
        .collect();

    if !user.is_developer() {
        let owned: HashSet<DbId> = WarehouseRepo::list(&state.pool, Some(user.user_id))
            .await?
            .into_iter()
            .map(|w| w.id)
            .collect();
        lines.retain(|line| owned.contains(&line.warehouse_id));
    }

    let reservations: Vec<ProjectReservation> =
        ProjectMaterialRepo::list_active_reservations(&state.pool)
            .await?
            .into_iter()
            .filter_map(ReservationRow::into_reservation)
            .collect();

    let warnings = scan_low_stock(&lines, &reservations);
    tracing::debug!(
        lines = lines.len(),
        warnings = warnings.len(),
        "Low-stock scan complete"
    );
    Ok(Json(DataResponse { data: warnings }))
}
