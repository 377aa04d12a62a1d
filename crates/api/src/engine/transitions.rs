//! Status changes driven through the workflow table.

use roofdesk_core::error::CoreError;
use roofdesk_core::roles::Role;
use roofdesk_core::types::DbId;
use roofdesk_core::workflow::{validate_transition, ProjectStatus, TransitionEffects};
use roofdesk_db::models::activity::CreateActivity;
use roofdesk_db::models::project::{Project, StatusChange};
use roofdesk_db::repositories::{ActivityRepo, ProjectRepo, UserRepo};
use roofdesk_events::ProjectNotice;
use serde_json::json;

use crate::error::{not_found, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Load a live project the caller is allowed to see.
///
/// Projects the caller has no part in are reported as missing.
pub async fn load_visible(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Project> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Project", id))?;

    if auth.is_developer() || project.involves(auth.user_id) {
        Ok(project)
    } else {
        Err(not_found("Project", id))
    }
}

/// Parse the stored status of a project.
pub fn current_status(project: &Project) -> AppResult<ProjectStatus> {
    ProjectStatus::from_str_db(&project.status).map_err(|_| {
        AppError::InternalError(format!(
            "Project {} has unknown status '{}'",
            project.id, project.status
        ))
    })
}

/// Contractor-side actions need the assigned contractor (or a developer).
pub fn ensure_assigned_contractor(project: &Project, auth: &AuthUser) -> AppResult<()> {
    match auth.role {
        Role::Developer => Ok(()),
        Role::Admin if project.contractor_id == Some(auth.user_id) => Ok(()),
        _ => Err(AppError::Core(CoreError::Forbidden(
            "Only the assigned contractor may do this".into(),
        ))),
    }
}

/// Returning materials is open to any admin who can see the project, as well
/// as the assigned contractor and developers.
pub fn ensure_can_return_materials(project: &Project, auth: &AuthUser) -> AppResult<()> {
    match auth.role {
        Role::Developer | Role::Admin => Ok(()),
        Role::Client => ensure_assigned_contractor(project, auth),
    }
}

/// Run the transition table for `project -> to` as `auth`.
pub fn check(
    project: &Project,
    to: ProjectStatus,
    auth: &AuthUser,
) -> AppResult<TransitionEffects> {
    check_with(project, to, auth, project.has_proposal())
}

/// Like [`check`], with the proposal presence supplied by the caller.
pub fn check_with(
    project: &Project,
    to: ProjectStatus,
    auth: &AuthUser,
    has_proposal: bool,
) -> AppResult<TransitionEffects> {
    let from = current_status(project)?;
    let snapshot = project.snapshot();
    Ok(validate_transition(
        from,
        to,
        auth.role,
        has_proposal,
        Some(&snapshot),
    )?)
}

/// Build the row update for a validated transition.
pub fn status_change(
    to: ProjectStatus,
    effects: TransitionEffects,
    decline_reason: Option<String>,
) -> StatusChange {
    StatusChange {
        status: to.as_str().to_string(),
        proposal_status: effects.proposal_status.map(|s| s.as_str().to_string()),
        decline_reason,
    }
}

/// Validate and write a plain status transition, recording activity.
pub async fn transition(
    state: &AppState,
    auth: &AuthUser,
    project: &Project,
    to: ProjectStatus,
    decline_reason: Option<String>,
) -> AppResult<Project> {
    let effects = check(project, to, auth)?;
    write_status(state, auth, project, to, status_change(to, effects, decline_reason)).await
}

/// Write an already validated status change and record activity.
pub async fn write_status(
    state: &AppState,
    auth: &AuthUser,
    project: &Project,
    to: ProjectStatus,
    change: StatusChange,
) -> AppResult<Project> {
    let updated = ProjectRepo::apply_status(&state.pool, project.id, &change)
        .await?
        .ok_or_else(|| not_found("Project", project.id))?;

    record_status_activity(state, auth.user_id, project, to).await;
    Ok(updated)
}

/// Append a status-change activity row. Failures are logged only.
pub async fn record_status_activity(
    state: &AppState,
    user_id: DbId,
    project: &Project,
    to: ProjectStatus,
) {
    tracing::info!(
        project_id = project.id,
        from = %project.status,
        to = %to,
        user_id,
        "Project status changed"
    );
    record_activity(
        state,
        user_id,
        "project.status_changed",
        format!("\"{}\" moved from {} to {}", project.name, project.status, to),
        json!({ "project_id": project.id, "from": project.status, "to": to.as_str() }),
    )
    .await;
}

/// Append an activity row. The log is best effort: a failed insert never
/// fails the operation being logged.
pub async fn record_activity(
    state: &AppState,
    user_id: DbId,
    activity_type: &str,
    description: String,
    metadata: serde_json::Value,
) {
    let input = CreateActivity {
        user_id,
        activity_type: activity_type.to_string(),
        description,
        metadata,
    };
    if let Err(e) = ActivityRepo::create(&state.pool, &input).await {
        tracing::warn!(error = %e, activity_type, user_id, "Failed to record activity");
    }
}

/// The client side of a project: the assigned client, else the owner.
pub fn client_of(project: &Project) -> DbId {
    project.client_id.unwrap_or(project.user_id)
}

/// Publish a workflow notice for `to_user` on the event bus.
///
/// Nothing is sent when the recipient is the actor. For emailed event types
/// the recipient's address is looked up here so the dispatcher does not
/// need to; a failed lookup just means no email.
pub async fn notify(
    state: &AppState,
    event_type: &str,
    project: &Project,
    from_user: DbId,
    to_user: Option<DbId>,
    detail: Option<String>,
) {
    let Some(to_user) = to_user.filter(|to| *to != from_user) else {
        return;
    };

    let mut notice = ProjectNotice::new(event_type, project.id, &project.name, from_user, to_user)
        .with_detail(detail);

    if notice.wants_email() {
        match UserRepo::find_by_id(&state.pool, to_user).await {
            Ok(user) => notice = notice.with_email(user.map(|u| u.email)),
            Err(e) => tracing::warn!(error = %e, to_user, "Failed to look up notice recipient"),
        }
    }

    let delivered = state.event_bus.publish(notice.into_event());
    tracing::debug!(event_type, project_id = project.id, delivered, "Published project notice");
}
