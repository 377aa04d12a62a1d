//! Warehouses and the stock they hold.

use roofdesk_core::materials::{unit_volume, StockLevel, StockLine};
use roofdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `warehouses` table. `capacity` is a volume in the same
/// unit³ as pricing dimensions.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Warehouse {
    pub id: DbId,
    pub name: String,
    pub address: Option<String>,
    pub capacity: f64,
    pub owner_id: DbId,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWarehouse {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    pub address: Option<String>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub capacity: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateWarehouse {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: Option<String>,
    pub address: Option<String>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub capacity: Option<f64>,
}

/// A row from `warehouse_materials`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WarehouseMaterial {
    pub id: DbId,
    pub warehouse_id: DbId,
    pub material_id: DbId,
    pub quantity: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Warehouse material joined with its pricing entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StockedMaterial {
    pub id: DbId,
    pub warehouse_id: DbId,
    pub material_id: DbId,
    pub material_name: String,
    pub category: String,
    pub unit: String,
    pub unit_price: f64,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub quantity: i32,
    pub updated_at: Timestamp,
}

impl StockedMaterial {
    pub fn unit_volume(&self) -> f64 {
        unit_volume(self.length, self.width, self.height)
    }
}

/// Active stock line across all active warehouses, as read by the
/// low-stock scan.
#[derive(Debug, Clone, FromRow)]
pub struct StockLineRow {
    pub warehouse_material_id: DbId,
    pub warehouse_id: DbId,
    pub warehouse_name: String,
    pub material_id: DbId,
    pub material_name: String,
    pub category: String,
    pub quantity: i32,
}

impl From<StockLineRow> for StockLine {
    fn from(row: StockLineRow) -> Self {
        StockLine {
            warehouse_material_id: row.warehouse_material_id,
            warehouse_id: row.warehouse_id,
            warehouse_name: row.warehouse_name,
            material_id: row.material_id,
            material_name: row.material_name,
            category: row.category,
            quantity: row.quantity,
        }
    }
}

/// Current quantity of one material at one warehouse, keyed both ways.
#[derive(Debug, Clone, FromRow)]
pub struct StockLevelRow {
    pub warehouse_material_id: DbId,
    pub material_id: DbId,
    pub material_name: String,
    pub quantity: i32,
}

impl StockLevelRow {
    pub fn to_level(&self) -> StockLevel {
        StockLevel {
            material_id: self.material_id,
            material_name: self.material_name.clone(),
            available: self.quantity,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddWarehouseMaterial {
    pub material_id: DbId,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetQuantity {
    #[validate(range(min = 0, message = "must not be negative"))]
    pub quantity: i32,
}
