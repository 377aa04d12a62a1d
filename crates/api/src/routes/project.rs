//! Route definitions for the `/projects` resource.
//!
//! All endpoints require authentication. Workflow endpoints are thin
//! wrappers over a single status transition each.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{project, project_material, workflow};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                          -> list_projects
/// POST   /                          -> create_project
/// GET    /{id}                      -> get_project
/// PUT    /{id}                      -> update_project
/// DELETE /{id}                      -> delete_project
/// POST   /{id}/restore              -> restore_project
/// DELETE /{id}/permanent            -> delete_project_permanently
///
/// POST   /{id}/activate             -> activate
/// POST   /{id}/send-to-contractor   -> send_to_contractor
/// POST   /{id}/review               -> start_review
/// POST   /{id}/proposal             -> send_proposal
/// POST   /{id}/accept               -> accept_proposal
/// POST   /{id}/decline              -> decline_proposal
/// POST   /{id}/revise               -> request_revision
/// POST   /{id}/start                -> start_work
/// POST   /{id}/finish               -> finish_work
/// POST   /{id}/archive              -> archive
/// POST   /{id}/unarchive            -> unarchive
///
/// GET    /{id}/materials            -> list_materials
/// POST   /{id}/materials            -> reserve_materials
/// POST   /{id}/materials/return     -> return_materials
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(project::list_projects).post(project::create_project),
        )
        .route(
            "/{id}",
            get(project::get_project)
                .put(project::update_project)
                .delete(project::delete_project),
        )
        .route("/{id}/restore", post(project::restore_project))
        .route(
            "/{id}/permanent",
            delete(project::delete_project_permanently),
        )
        // Workflow
        .route("/{id}/activate", post(workflow::activate))
        .route(
            "/{id}/send-to-contractor",
            post(workflow::send_to_contractor),
        )
        .route("/{id}/review", post(workflow::start_review))
        .route("/{id}/proposal", post(workflow::send_proposal))
        .route("/{id}/accept", post(workflow::accept_proposal))
        .route("/{id}/decline", post(workflow::decline_proposal))
        .route("/{id}/revise", post(workflow::request_revision))
        .route("/{id}/start", post(workflow::start_work))
        .route("/{id}/finish", post(workflow::finish_work))
        .route("/{id}/archive", post(workflow::archive))
        .route("/{id}/unarchive", post(workflow::unarchive))
        // Material ledger
        .route(
            "/{id}/materials",
            get(project_material::list_materials).post(project_material::reserve_materials),
        )
        .route(
            "/{id}/materials/return",
            post(project_material::return_materials),
        )
}
