//! Workflow actions on `/projects/{id}/...`.
//!
//! Every action re-reads the project, runs the transition table for the
//! caller's role, writes the new status together with its side-effect fields,
//! records an activity row and publishes a notice for the other party.

use axum::extract::{Path, State};
use axum::Json;
use roofdesk_core::error::CoreError;
use roofdesk_core::materials::{merge_required, RequiredMaterial};
use roofdesk_core::roles::Role;
use roofdesk_core::types::DbId;
use roofdesk_core::validation::validate_input;
use roofdesk_core::workflow::{validate_transition, ProjectSnapshot, ProjectStatus};
use roofdesk_db::models::project::{Project, ProposalDetails};
use roofdesk_db::models::project_material::ProjectMaterial;
use roofdesk_db::repositories::{ProjectRepo, UserRepo, WarehouseRepo};
use roofdesk_events::notice::{
    PROJECT_COMPLETED, PROJECT_REVIEW_STARTED, PROJECT_SENT_TO_CONTRACTOR, PROJECT_STARTED,
    PROPOSAL_ACCEPTED, PROPOSAL_REJECTED, PROPOSAL_REVISION_REQUESTED, PROPOSAL_SENT,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::ledger;
use crate::engine::transitions::{
    check, check_with, client_of, current_status, ensure_assigned_contractor, load_visible,
    notify, record_status_activity, status_change, transition, write_status,
};
use crate::error::{not_found, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SendToContractorRequest {
    pub contractor_id: DbId,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProposalRequest {
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub amount: f64,
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub notes: Option<String>,
    /// Warehouse the materials will be drawn from.
    pub warehouse_id: DbId,
    #[validate(nested)]
    #[serde(default)]
    pub materials: Vec<RequiredMaterial>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeclineRequest {
    pub reason: Option<String>,
}

/// A project together with the ledger lines a transition moved.
#[derive(Debug, Serialize)]
pub struct ProjectWithMaterials {
    pub project: Project,
    pub materials: Vec<ProjectMaterial>,
}

type ProjectResponse = AppResult<Json<DataResponse<Project>>>;

fn respond(project: Project) -> ProjectResponse {
    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/projects/{id}/activate
///
/// DRAFT -> ACTIVE, for projects kept for personal use.
pub async fn activate(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ProjectResponse {
    let project = load_visible(&state, &auth, id).await?;
    respond(transition(&state, &auth, &project, ProjectStatus::Active, None).await?)
}

/// POST /api/v1/projects/{id}/send-to-contractor
///
/// DRAFT -> CLIENT_PENDING. Assigns the contractor, and the owner as client,
/// in the same transaction as the status write.
pub async fn send_to_contractor(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SendToContractorRequest>,
) -> ProjectResponse {
    let project = load_visible(&state, &auth, id).await?;

    let contractor = UserRepo::find_by_id(&state.pool, input.contractor_id)
        .await?
        .filter(|u| u.is_active && u.role == Role::Admin.as_str())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "contractor_id: must refer to an active contractor".into(),
            ))
        })?;

    let from = current_status(&project)?;
    let to = ProjectStatus::ClientPending;
    let snapshot = ProjectSnapshot {
        contractor_id: Some(contractor.id),
        client_id: Some(project.user_id),
    };
    let effects = validate_transition(
        from,
        to,
        auth.role,
        project.has_proposal(),
        Some(&snapshot),
    )?;

    let updated = ProjectRepo::send_to_contractor(
        &state.pool,
        id,
        from,
        contractor.id,
        project.user_id,
        &status_change(to, effects, None),
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "Project was changed by another request".into(),
        ))
    })?;

    record_status_activity(&state, auth.user_id, &project, to).await;
    notify(
        &state,
        PROJECT_SENT_TO_CONTRACTOR,
        &updated,
        auth.user_id,
        Some(contractor.id),
        None,
    )
    .await;
    respond(updated)
}

/// POST /api/v1/projects/{id}/review
///
/// CLIENT_PENDING -> CONTRACTOR_REVIEWING, by the assigned contractor.
pub async fn start_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ProjectResponse {
    let project = load_visible(&state, &auth, id).await?;
    ensure_assigned_contractor(&project, &auth)?;

    let updated = transition(
        &state,
        &auth,
        &project,
        ProjectStatus::ContractorReviewing,
        None,
    )
    .await?;
    notify(
        &state,
        PROJECT_REVIEW_STARTED,
        &updated,
        auth.user_id,
        Some(client_of(&updated)),
        None,
    )
    .await;
    respond(updated)
}

/// POST /api/v1/projects/{id}/proposal
///
/// CONTRACTOR_REVIEWING -> PROPOSAL_SENT. Records amount, notes, source
/// warehouse and the materials the job needs.
pub async fn send_proposal(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ProposalRequest>,
) -> ProjectResponse {
    validate_input(&input)?;

    let project = load_visible(&state, &auth, id).await?;
    ensure_assigned_contractor(&project, &auth)?;

    WarehouseRepo::find_by_id(&state.pool, input.warehouse_id)
        .await?
        .ok_or_else(|| not_found("Warehouse", input.warehouse_id))?;

    let to = ProjectStatus::ProposalSent;
    let effects = check_with(&project, to, &auth, true)?;

    let proposal = ProposalDetails {
        amount: input.amount,
        notes: input.notes,
        warehouse_id: input.warehouse_id,
        materials: merge_required(&input.materials)?,
    };
    let updated = ProjectRepo::record_proposal(
        &state.pool,
        id,
        &proposal,
        &status_change(to, effects, None),
    )
    .await?
    .ok_or_else(|| not_found("Project", id))?;

    record_status_activity(&state, auth.user_id, &project, to).await;
    notify(
        &state,
        PROPOSAL_SENT,
        &updated,
        auth.user_id,
        Some(client_of(&updated)),
        None,
    )
    .await;
    respond(updated)
}

/// POST /api/v1/projects/{id}/accept
///
/// PROPOSAL_SENT -> ACCEPTED. The proposal's materials must be in stock at
/// its warehouse (409 `INSUFFICIENT_MATERIALS` otherwise); they are reserved
/// before the status is written.
pub async fn accept_proposal(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectWithMaterials>>> {
    let project = load_visible(&state, &auth, id).await?;

    let to = ProjectStatus::Accepted;
    let effects = check(&project, to, &auth)?;

    let materials = match project.warehouse_id {
        Some(warehouse_id) => {
            ledger::reserve(&state, id, warehouse_id, &project.proposal_material_list()).await?
        }
        None => Vec::new(),
    };

    let updated = write_status(
        &state,
        &auth,
        &project,
        to,
        status_change(to, effects, None),
    )
    .await?;
    notify(
        &state,
        PROPOSAL_ACCEPTED,
        &updated,
        auth.user_id,
        updated.contractor_id,
        None,
    )
    .await;

    Ok(Json(DataResponse {
        data: ProjectWithMaterials {
            project: updated,
            materials,
        },
    }))
}

/// POST /api/v1/projects/{id}/decline
///
/// PROPOSAL_SENT -> REJECTED, with an optional reason passed on to the
/// contractor.
pub async fn decline_proposal(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Option<Json<DeclineRequest>>,
) -> ProjectResponse {
    let reason = input
        .and_then(|Json(body)| body.reason)
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    let project = load_visible(&state, &auth, id).await?;
    let updated = transition(
        &state,
        &auth,
        &project,
        ProjectStatus::Rejected,
        reason.clone(),
    )
    .await?;

    notify(
        &state,
        PROPOSAL_REJECTED,
        &updated,
        auth.user_id,
        updated.contractor_id,
        reason,
    )
    .await;
    respond(updated)
}

/// POST /api/v1/projects/{id}/revise
///
/// REJECTED -> CONTRACTOR_REVIEWING, asking for a new proposal.
pub async fn request_revision(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ProjectResponse {
    let project = load_visible(&state, &auth, id).await?;
    let updated = transition(
        &state,
        &auth,
        &project,
        ProjectStatus::ContractorReviewing,
        None,
    )
    .await?;

    let recipient = if updated.contractor_id == Some(auth.user_id) {
        Some(client_of(&updated))
    } else {
        updated.contractor_id
    };
    notify(
        &state,
        PROPOSAL_REVISION_REQUESTED,
        &updated,
        auth.user_id,
        recipient,
        None,
    )
    .await;
    respond(updated)
}

/// POST /api/v1/projects/{id}/start
///
/// ACCEPTED -> IN_PROGRESS, by the assigned contractor.
pub async fn start_work(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ProjectResponse {
    let project = load_visible(&state, &auth, id).await?;
    ensure_assigned_contractor(&project, &auth)?;

    let updated = transition(&state, &auth, &project, ProjectStatus::InProgress, None).await?;
    notify(
        &state,
        PROJECT_STARTED,
        &updated,
        auth.user_id,
        Some(client_of(&updated)),
        None,
    )
    .await;
    respond(updated)
}

/// POST /api/v1/projects/{id}/finish
///
/// IN_PROGRESS -> COMPLETED. Reserved materials are consumed from stock
/// first; if stock has run short the project stays in progress.
pub async fn finish_work(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectWithMaterials>>> {
    let project = load_visible(&state, &auth, id).await?;
    ensure_assigned_contractor(&project, &auth)?;

    let to = ProjectStatus::Completed;
    let effects = check(&project, to, &auth)?;

    let materials = ledger::consume(&state, id).await?;
    let updated = write_status(
        &state,
        &auth,
        &project,
        to,
        status_change(to, effects, None),
    )
    .await?;

    notify(
        &state,
        PROJECT_COMPLETED,
        &updated,
        auth.user_id,
        Some(client_of(&updated)),
        None,
    )
    .await;

    Ok(Json(DataResponse {
        data: ProjectWithMaterials {
            project: updated,
            materials,
        },
    }))
}

/// POST /api/v1/projects/{id}/archive
///
/// COMPLETED or REJECTED -> ARCHIVED.
pub async fn archive(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ProjectResponse {
    let project = load_visible(&state, &auth, id).await?;
    respond(transition(&state, &auth, &project, ProjectStatus::Archived, None).await?)
}

/// POST /api/v1/projects/{id}/unarchive
///
/// ARCHIVED -> COMPLETED.
pub async fn unarchive(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ProjectResponse {
    let project = load_visible(&state, &auth, id).await?;
    respond(transition(&state, &auth, &project, ProjectStatus::Completed, None).await?)
}
