//! Handlers for the `/auth` resource (login, register).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use roofdesk_core::error::CoreError;
use roofdesk_core::roles::Role;
use roofdesk_core::validation::validate_input;
use roofdesk_db::models::user::{CreateUser, User, UserResponse};
use roofdesk_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::engine::transitions::record_activity;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub password: String,
    /// `CLIENT` (default) or `ADMIN`. Developer accounts are created by
    /// another developer.
    pub role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password and return an access token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(auth_response(&state, user)?))
}

/// POST /api/v1/auth/register
///
/// Self-service sign-up for clients and contractors. Returns 201 with an
/// access token for the new account.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    validate_input(&input)?;
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let role = input.role.unwrap_or(Role::Client);
    if role == Role::Developer {
        return Err(AppError::Core(CoreError::Forbidden(
            "Developer accounts cannot be self-registered".into(),
        )));
    }

    let user = create_account(&state, &input.name, &input.email, &input.password, role).await?;
    record_activity(
        &state,
        user.id,
        "user.registered",
        format!("{} registered as {}", user.name, user.role),
        serde_json::json!({ "role": user.role }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(auth_response(&state, user)?)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Hash the password and insert the user row.
pub(crate) async fn create_account(
    state: &AppState,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> AppResult<User> {
    let password_hash = hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password_hash,
            role: role.as_str().to_string(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %role, "User account created");
    Ok(user)
}

fn auth_response(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let role = Role::from_str_db(&user.role)?;
    let access_token = generate_access_token(user.id, role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        access_token,
        expires_in: state.config.jwt.expires_in(),
        user: user.into(),
    })
}
