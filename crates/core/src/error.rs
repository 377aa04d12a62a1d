use crate::materials::MaterialShortage;
use crate::types::DbId;
use crate::workflow::WorkflowError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Insufficient materials: {} material(s) short", .0.len())]
    InsufficientMaterials(Vec<MaterialShortage>),

    #[error("Internal error: {0}")]
    Internal(String),
}
