//! Handlers for the `/users` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use roofdesk_core::error::CoreError;
use roofdesk_core::roles::{Role, ROLE_ADMIN};
use roofdesk_core::validation::validate_input;
use roofdesk_db::models::user::UserResponse;
use roofdesk_db::repositories::UserRepo;
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::validate_password_strength;
use crate::error::{not_found, AppError, AppResult};
use crate::handlers::auth::create_account;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireDeveloper;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// GET /api/v1/users/me
pub async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| not_found("User", auth.user_id))?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// GET /api/v1/users/contractors
///
/// Active contractor (ADMIN) accounts a client can send a project to.
pub async fn list_contractors(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list_by_role(&state.pool, ROLE_ADMIN).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// POST /api/v1/users
///
/// Create an account with any role. Developer only.
pub async fn create_user(
    RequireDeveloper(_dev): RequireDeveloper,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    validate_input(&input)?;
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let user = create_account(
        &state,
        &input.name,
        &input.email,
        &input.password,
        input.role,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: user.into() })))
}
