//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` create/update DTOs where the entity is writable over HTTP

pub mod activity;
pub mod notification;
pub mod pricing;
pub mod project;
pub mod project_material;
pub mod user;
pub mod warehouse;
