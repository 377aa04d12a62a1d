//! Request extractors for authentication and role checks.
//!
//! - [`auth::AuthUser`] -- the caller, decoded from a Bearer token.
//! - [`rbac::RequireInventoryManager`] -- ADMIN or DEVELOPER.
//! - [`rbac::RequireDeveloper`] -- DEVELOPER only.

pub mod auth;
pub mod rbac;
