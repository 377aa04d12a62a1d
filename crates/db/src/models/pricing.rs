//! Pricing configuration: the catalogue of materials and labor lines.

use roofdesk_core::materials::unit_volume;
use roofdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from `pricing_configs`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PricingConfig {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub unit_price: f64,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PricingConfig {
    pub fn unit_volume(&self) -> f64 {
        unit_volume(self.length, self.width, self.height)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePricingConfig {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub category: String,
    pub unit: Option<String>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub unit_price: f64,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub length: Option<f64>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub width: Option<f64>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePricingConfig {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub category: Option<String>,
    pub unit: Option<String>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub unit_price: Option<f64>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub length: Option<f64>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub width: Option<f64>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub height: Option<f64>,
}
