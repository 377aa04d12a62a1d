//! Handlers for a project's material ledger (`/projects/{id}/materials`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use roofdesk_core::error::CoreError;
use roofdesk_core::materials::RequiredMaterial;
use roofdesk_core::types::DbId;
use roofdesk_core::validation::{validate_input, validate_reason};
use roofdesk_core::workflow::RESERVING_STATUSES;
use roofdesk_db::models::project_material::{ProjectMaterial, ProjectMaterialDetail};
use roofdesk_db::repositories::ProjectMaterialRepo;
use roofdesk_events::notice::MATERIALS_RETURNED;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::engine::ledger;
use crate::engine::transitions::{
    client_of, current_status, ensure_assigned_contractor, ensure_can_return_materials,
    load_visible, notify, record_activity,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ReserveMaterialsRequest {
    pub warehouse_id: DbId,
    #[validate(length(min = 1, message = "must list at least one material"))]
    #[validate(nested)]
    pub materials: Vec<RequiredMaterial>,
}

#[derive(Debug, Deserialize)]
pub struct ReturnMaterialsRequest {
    pub reason: String,
    /// Return only these ledger lines. All returnable lines when absent.
    pub line_ids: Option<Vec<DbId>>,
}

/// GET /api/v1/projects/{id}/materials
pub async fn list_materials(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ProjectMaterialDetail>>>> {
    load_visible(&state, &auth, id).await?;
    let lines = ProjectMaterialRepo::list_for_project(&state.pool, id).await?;
    Ok(Json(DataResponse { data: lines }))
}

/// POST /api/v1/projects/{id}/materials
///
/// Reserve extra materials for a live job. Assigned contractor or developer;
/// checked against stock like an acceptance.
pub async fn reserve_materials(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReserveMaterialsRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<ProjectMaterial>>>)> {
    validate_input(&input)?;

    let project = load_visible(&state, &auth, id).await?;
    ensure_assigned_contractor(&project, &auth)?;

    let status = current_status(&project)?;
    if !RESERVING_STATUSES.contains(&status) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Materials cannot be reserved while the project is {status}"
        ))));
    }

    let reserved = ledger::reserve(&state, id, input.warehouse_id, &input.materials).await?;
    record_activity(
        &state,
        auth.user_id,
        "materials.reserved",
        format!(
            "Reserved {} material line(s) for \"{}\"",
            reserved.len(),
            project.name
        ),
        json!({ "project_id": id, "warehouse_id": input.warehouse_id, "lines": reserved.len() }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: reserved })))
}

/// POST /api/v1/projects/{id}/materials/return
///
/// Return reserved or consumed materials to stock. Requires a reason. Any
/// admin who can see the project may return, not only the contractor.
pub async fn return_materials(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReturnMaterialsRequest>,
) -> AppResult<Json<DataResponse<Vec<ProjectMaterial>>>> {
    validate_reason(&input.reason)?;
    let reason = input.reason.trim();

    let project = load_visible(&state, &auth, id).await?;
    ensure_can_return_materials(&project, &auth)?;

    let returned = ledger::return_lines(&state, id, reason, input.line_ids.as_deref()).await?;

    record_activity(
        &state,
        auth.user_id,
        "materials.returned",
        format!(
            "Returned {} material line(s) of \"{}\": {reason}",
            returned.len(),
            project.name
        ),
        json!({
            "project_id": id,
            "line_ids": returned.iter().map(|l| l.id).collect::<Vec<_>>(),
            "reason": reason,
        }),
    )
    .await;
    notify(
        &state,
        MATERIALS_RETURNED,
        &project,
        auth.user_id,
        Some(client_of(&project)),
        Some(reason.to_string()),
    )
    .await;

    Ok(Json(DataResponse { data: returned }))
}
