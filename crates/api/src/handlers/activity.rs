//! Handlers for the `/activities` audit log.

use axum::extract::{Query, State};
use axum::Json;
use roofdesk_core::error::CoreError;
use roofdesk_core::types::DbId;
use roofdesk_db::models::activity::Activity;
use roofdesk_db::repositories::ActivityRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    /// Another user's log. Developers only.
    pub user_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/activities
pub async fn list_activities(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ActivityQuery>,
) -> AppResult<Json<DataResponse<Vec<Activity>>>> {
    let user_id = params.user_id.unwrap_or(auth.user_id);
    if user_id != auth.user_id && !auth.is_developer() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only developers may read another user's activity".into(),
        )));
    }

    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let activities =
        ActivityRepo::list_for_user(&state.pool, user_id, page.limit(), page.offset())
            .await?;
    Ok(Json(DataResponse { data: activities }))
}
