use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use roofdesk_core::error::CoreError;
use roofdesk_core::workflow::WorkflowError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce `{"error", "code"}` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        AppError::Core(CoreError::Workflow(err))
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Shorthand for a 404 on `entity` with `id`.
pub fn not_found(entity: &'static str, id: roofdesk_core::types::DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut extra = None;

        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Workflow(err) => {
                    let (status, code) = classify_workflow_error(err);
                    (status, code, err.to_string())
                }
                CoreError::InsufficientMaterials(shortages) => {
                    extra = Some(("shortages", json!(shortages)));
                    (
                        StatusCode::CONFLICT,
                        "INSUFFICIENT_MATERIALS",
                        core.to_string(),
                    )
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let (Some((key, value)), Some(map)) = (extra, body.as_object_mut()) {
            map.insert(key.to_string(), value);
        }

        (status, axum::Json(body)).into_response()
    }
}

fn classify_workflow_error(err: &WorkflowError) -> (StatusCode, &'static str) {
    match err {
        WorkflowError::InvalidTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
        WorkflowError::RoleNotPermitted { .. } => (StatusCode::FORBIDDEN, "ROLE_NOT_PERMITTED"),
        WorkflowError::ProposalRequired { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "PROPOSAL_REQUIRED")
        }
        WorkflowError::MissingAssignment { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "MISSING_ASSIGNMENT")
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use roofdesk_core::materials::MaterialShortage;
    use roofdesk_core::roles::Role;
    use roofdesk_core::workflow::ProjectStatus;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn workflow_errors_map_to_stable_codes() {
        let (status, body) = render(
            WorkflowError::InvalidTransition {
                from: ProjectStatus::Draft,
                to: ProjectStatus::Completed,
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INVALID_TRANSITION");

        let (status, body) = render(
            WorkflowError::RoleNotPermitted {
                role: Role::Client,
                from: ProjectStatus::InProgress,
                to: ProjectStatus::Completed,
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "ROLE_NOT_PERMITTED");

        let (status, body) = render(
            WorkflowError::ProposalRequired {
                from: ProjectStatus::ProposalSent,
                to: ProjectStatus::Accepted,
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "PROPOSAL_REQUIRED");
    }

    #[tokio::test]
    async fn insufficient_materials_lists_shortages() {
        let err = AppError::Core(CoreError::InsufficientMaterials(vec![MaterialShortage {
            material_id: 3,
            material_name: "Shingles".to_string(),
            required: 10,
            available: 8,
            shortage: 2,
        }]));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INSUFFICIENT_MATERIALS");
        assert_eq!(body["shortages"][0]["shortage"], 2);
        assert_eq!(body["shortages"][0]["material_name"], "Shingles");
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let (status, body) = render(AppError::InternalError("pool exhausted".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal error occurred");
    }
}
