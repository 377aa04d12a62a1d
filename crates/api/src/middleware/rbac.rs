//! Role-based access control extractors.
//!
//! Each wraps [`AuthUser`] and rejects with 403 when the caller's role is
//! not enough for the route.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use roofdesk_core::error::CoreError;
use roofdesk_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a role that manages warehouses, pricing and inventory
/// (`ADMIN` or `DEVELOPER`).
///
/// ```ignore
/// async fn restock(RequireInventoryManager(user): RequireInventoryManager) -> AppResult<()> {
///     Ok(())
/// }
/// ```
pub struct RequireInventoryManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireInventoryManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.can_manage_inventory() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin or Developer role required".into(),
            )));
        }
        Ok(RequireInventoryManager(user))
    }
}

/// Requires the `DEVELOPER` role.
pub struct RequireDeveloper(pub AuthUser);

impl FromRequestParts<AppState> for RequireDeveloper {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Developer {
            return Err(AppError::Core(CoreError::Forbidden(
                "Developer role required".into(),
            )));
        }
        Ok(RequireDeveloper(user))
    }
}
