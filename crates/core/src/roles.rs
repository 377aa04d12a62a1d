//! Role model.
//!
//! The string values must match the `role` CHECK constraint on the `users`
//! table and the `role` claim carried in access tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_CLIENT: &str = "CLIENT";
pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_DEVELOPER: &str = "DEVELOPER";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_CLIENT, ROLE_ADMIN, ROLE_DEVELOPER];

/// Caller role. `Admin` is the contractor role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Client,
    Admin,
    Developer,
}

impl Role {
    /// Parse a role string from the database or a token claim.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            ROLE_CLIENT => Ok(Self::Client),
            ROLE_ADMIN => Ok(Self::Admin),
            ROLE_DEVELOPER => Ok(Self::Developer),
            _ => Err(CoreError::Validation(format!(
                "Invalid role '{s}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => ROLE_CLIENT,
            Self::Admin => ROLE_ADMIN,
            Self::Developer => ROLE_DEVELOPER,
        }
    }

    /// Contractors and developers manage warehouses, pricing and inventory.
    pub fn can_manage_inventory(&self) -> bool {
        matches!(self, Self::Admin | Self::Developer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
