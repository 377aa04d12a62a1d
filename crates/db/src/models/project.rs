//! Project entity model and DTOs.

use roofdesk_core::materials::RequiredMaterial;
use roofdesk_core::types::{DbId, Timestamp};
use roofdesk_core::workflow::ProjectSnapshot;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `projects` table.
///
/// `status` and `proposal_status` hold the database strings of
/// `ProjectStatus` / `ProposalStatus`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub address: Option<String>,
    pub user_id: DbId,
    pub client_id: Option<DbId>,
    pub contractor_id: Option<DbId>,
    pub status: String,
    pub proposal_status: Option<String>,
    pub roof_area: Option<f64>,
    pub roof_pitch: Option<f64>,
    pub estimated_cost: Option<f64>,
    pub proposal_amount: Option<f64>,
    pub proposal_notes: Option<String>,
    pub proposal_materials: Option<serde_json::Value>,
    pub proposal_sent_at: Option<Timestamp>,
    pub decline_reason: Option<String>,
    pub warehouse_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl Project {
    /// Whether a proposal amount has been recorded.
    pub fn has_proposal(&self) -> bool {
        self.proposal_amount.is_some()
    }

    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            contractor_id: self.contractor_id,
            client_id: self.client_id,
        }
    }

    /// Materials listed in the proposal. Malformed JSON yields an empty list.
    pub fn proposal_material_list(&self) -> Vec<RequiredMaterial> {
        self.proposal_materials
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    /// Any of the three user references points at `user_id`.
    pub fn involves(&self, user_id: DbId) -> bool {
        self.user_id == user_id
            || self.client_id == Some(user_id)
            || self.contractor_id == Some(user_id)
    }
}

/// DTO for creating a new project. Projects always start in `DRAFT`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    pub address: Option<String>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub roof_area: Option<f64>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub roof_pitch: Option<f64>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub estimated_cost: Option<f64>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: Option<String>,
    pub address: Option<String>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub roof_area: Option<f64>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub roof_pitch: Option<f64>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub estimated_cost: Option<f64>,
}

/// Fields written together with a status change.
#[derive(Debug, Clone, Default)]
pub struct StatusChange {
    pub status: String,
    pub proposal_status: Option<String>,
    pub decline_reason: Option<String>,
}

/// Proposal payload written when a contractor sends a proposal.
#[derive(Debug, Clone)]
pub struct ProposalDetails {
    pub amount: f64,
    pub notes: Option<String>,
    pub warehouse_id: DbId,
    pub materials: Vec<RequiredMaterial>,
}
