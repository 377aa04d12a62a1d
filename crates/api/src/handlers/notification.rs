//! Handlers for the `/notifications` resource.
//!
//! Callers only ever see and change their own rows.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use roofdesk_core::types::DbId;
use roofdesk_db::repositories::NotificationRepo;
use serde::Deserialize;

use crate::error::{not_found, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::state::AppState;

/// Query parameters for `GET /notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// If `true`, return only unread notifications.
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `DELETE /notifications`.
#[derive(Debug, Default, Deserialize)]
pub struct BulkDeleteQuery {
    /// If `true`, only read notifications are deleted.
    pub read_only: Option<bool>,
}

/// GET /api/v1/notifications
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let notifications = NotificationRepo::list_for_user(
        &state.pool,
        auth.user_id,
        params.unread_only.unwrap_or(false),
        page.limit(),
        page.offset(),
    )
    .await?;

    Ok(Json(serde_json::json!({ "data": notifications })))
}

/// POST /api/v1/notifications/{id}/read
///
/// 204 on success; 404 if the notification is not the caller's or is
/// already read.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !NotificationRepo::mark_read(&state.pool, notification_id, auth.user_id).await? {
        return Err(not_found("Notification", notification_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = NotificationRepo::mark_all_read(&state.pool, auth.user_id).await?;
    Ok(Json(serde_json::json!({
        "data": { "marked_read": count }
    })))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = NotificationRepo::unread_count(&state.pool, auth.user_id).await?;
    Ok(Json(serde_json::json!({
        "data": { "count": count }
    })))
}

/// DELETE /api/v1/notifications/{id}
pub async fn delete_notification(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !NotificationRepo::delete(&state.pool, notification_id, auth.user_id).await? {
        return Err(not_found("Notification", notification_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/notifications
///
/// Bulk delete of the caller's notifications (`?read_only=true` keeps unread).
pub async fn delete_all_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<BulkDeleteQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = NotificationRepo::delete_all_for_user(
        &state.pool,
        auth.user_id,
        params.read_only.unwrap_or(false),
    )
    .await?;
    Ok(Json(serde_json::json!({
        "data": { "deleted": deleted }
    })))
}
