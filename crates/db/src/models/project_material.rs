//! Project material ledger lines.

use roofdesk_core::materials::{LineStatus, ProjectReservation};
use roofdesk_core::types::{DbId, Timestamp};
use roofdesk_core::workflow::ProjectStatus;
use serde::Serialize;
use sqlx::FromRow;

/// A row from `project_materials`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectMaterial {
    pub id: DbId,
    pub project_id: DbId,
    pub warehouse_material_id: DbId,
    pub quantity: i32,
    pub status: String,
    pub return_reason: Option<String>,
    pub reserved_at: Timestamp,
    pub consumed_at: Option<Timestamp>,
    pub returned_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectMaterial {
    /// Parsed line status. The column carries a CHECK constraint, so an
    /// unknown value means the schema and code disagree.
    pub fn line_status(&self) -> Option<LineStatus> {
        LineStatus::from_str_db(&self.status).ok()
    }
}

/// Ledger line joined with material and warehouse names for display.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectMaterialDetail {
    pub id: DbId,
    pub project_id: DbId,
    pub warehouse_material_id: DbId,
    pub warehouse_id: DbId,
    pub warehouse_name: String,
    pub material_id: DbId,
    pub material_name: String,
    pub category: String,
    pub unit_price: f64,
    pub quantity: i32,
    pub status: String,
    pub return_reason: Option<String>,
    pub reserved_at: Timestamp,
    pub consumed_at: Option<Timestamp>,
    pub returned_at: Option<Timestamp>,
}

/// One line to reserve: a warehouse stock row and a quantity.
#[derive(Debug, Clone, Copy)]
pub struct ReserveLine {
    pub warehouse_material_id: DbId,
    pub quantity: i32,
}

/// Reserved line plus the owning project's status, for the low-stock scan.
#[derive(Debug, Clone, FromRow)]
pub struct ReservationRow {
    pub warehouse_material_id: DbId,
    pub project_id: DbId,
    pub project_name: String,
    pub project_status: String,
    pub quantity: i32,
}

impl ReservationRow {
    /// Convert into the scan input. Rows with an unknown project status are
    /// dropped.
    pub fn into_reservation(self) -> Option<ProjectReservation> {
        let project_status = ProjectStatus::from_str_db(&self.project_status).ok()?;
        Some(ProjectReservation {
            warehouse_material_id: self.warehouse_material_id,
            project_id: self.project_id,
            project_name: self.project_name,
            project_status,
            quantity: self.quantity,
        })
    }
}
