//! Handlers for the `/projects` resource: CRUD, archive and restore.
//!
//! Status changes live in [`super::workflow`]; ledger endpoints in
//! [`super::project_material`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use roofdesk_core::error::CoreError;
use roofdesk_core::types::DbId;
use roofdesk_core::validation::validate_input;
use roofdesk_core::workflow::{allowed_targets, ProjectStatus};
use roofdesk_db::models::project::{CreateProject, Project, UpdateProject};
use roofdesk_db::repositories::ProjectRepo;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::engine::transitions::{current_status, load_visible, record_activity};
use crate::error::{not_found, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /projects`.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListQuery {
    /// Return the caller's archived (soft-deleted) projects instead.
    pub include_archived: Option<bool>,
}

/// A project with the statuses the caller could move it to next.
#[derive(Debug, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub allowed_transitions: Vec<ProjectStatus>,
}

fn owner_or_developer(project: &Project, auth: &AuthUser) -> AppResult<()> {
    if auth.is_developer() || project.user_id == auth.user_id {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Only the project owner may do this".into(),
        )))
    }
}

/// GET /api/v1/projects
pub async fn list_projects(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ProjectListQuery>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = if params.include_archived.unwrap_or(false) {
        ProjectRepo::list_deleted_owned(&state.pool, auth.user_id).await?
    } else {
        ProjectRepo::list_visible(&state.pool, auth.user_id, auth.role).await?
    };
    Ok(Json(DataResponse { data: projects }))
}

/// POST /api/v1/projects
///
/// Create a project in `DRAFT`, owned by the caller.
pub async fn create_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    validate_input(&input)?;

    let project = ProjectRepo::create(&state.pool, auth.user_id, &input).await?;
    tracing::info!(project_id = project.id, user_id = auth.user_id, "Project created");
    record_activity(
        &state,
        auth.user_id,
        "project.created",
        format!("Created project \"{}\"", project.name),
        json!({ "project_id": project.id }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects/{id}
pub async fn get_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectView>>> {
    let project = load_visible(&state, &auth, id).await?;
    let allowed_transitions = allowed_targets(current_status(&project)?, auth.role);
    Ok(Json(DataResponse {
        data: ProjectView {
            project,
            allowed_transitions,
        },
    }))
}

/// PUT /api/v1/projects/{id}
///
/// Edit a project's details. Only while it is `DRAFT` or `ACTIVE`.
pub async fn update_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<Project>>> {
    validate_input(&input)?;

    let project = load_visible(&state, &auth, id).await?;
    owner_or_developer(&project, &auth)?;

    let status = current_status(&project)?;
    if !status.is_editable() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Project cannot be edited while {status}"
        ))));
    }

    let updated = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("Project", id))?;
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/projects/{id}
///
/// Archive (soft-delete) a project. Its reserved materials are released.
pub async fn delete_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let project = load_visible(&state, &auth, id).await?;
    owner_or_developer(&project, &auth)?;

    if !ProjectRepo::soft_delete(&state.pool, id).await? {
        return Err(not_found("Project", id));
    }

    record_activity(
        &state,
        auth.user_id,
        "project.deleted",
        format!("Archived project \"{}\"", project.name),
        json!({ "project_id": id }),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

/// Load an archived project owned by the caller.
async fn load_archived_owned(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Project> {
    let project = ProjectRepo::find_by_id_include_deleted(&state.pool, id)
        .await?
        .filter(|p| p.user_id == auth.user_id)
        .ok_or_else(|| not_found("Project", id))?;

    if project.deleted_at.is_none() {
        return Err(AppError::Core(CoreError::Conflict(
            "Project is not archived".into(),
        )));
    }
    Ok(project)
}

/// POST /api/v1/projects/{id}/restore
///
/// Bring an archived project back. Owner only. Released materials are not
/// re-reserved.
pub async fn restore_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = load_archived_owned(&state, &auth, id).await?;
    ProjectRepo::restore(&state.pool, id).await?;

    record_activity(
        &state,
        auth.user_id,
        "project.restored",
        format!("Restored project \"{}\"", project.name),
        json!({ "project_id": id }),
    )
    .await;

    let restored = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Project", id))?;
    Ok(Json(DataResponse { data: restored }))
}

/// DELETE /api/v1/projects/{id}/permanent
///
/// Permanently delete an archived project. Owner only.
pub async fn delete_project_permanently(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let project = load_archived_owned(&state, &auth, id).await?;
    if !ProjectRepo::hard_delete(&state.pool, id).await? {
        return Err(not_found("Project", id));
    }

    tracing::info!(project_id = id, user_id = auth.user_id, "Project permanently deleted");
    record_activity(
        &state,
        auth.user_id,
        "project.purged",
        format!("Permanently deleted project \"{}\"", project.name),
        json!({ "project_id": id }),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}
