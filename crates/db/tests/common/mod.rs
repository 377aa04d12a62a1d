//! Fixtures shared by the repository integration tests.

#![allow(dead_code)]

use roofdesk_db::models::pricing::{CreatePricingConfig, PricingConfig};
use roofdesk_db::models::project::{CreateProject, Project};
use roofdesk_db::models::user::{CreateUser, User};
use roofdesk_db::models::warehouse::{
    AddWarehouseMaterial, CreateWarehouse, Warehouse, WarehouseMaterial,
};
use roofdesk_db::repositories::{
    PricingConfigRepo, ProjectRepo, UserRepo, WarehouseMaterialRepo, WarehouseRepo,
};
use sqlx::PgPool;

pub async fn user(pool: &PgPool, email: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
}

pub async fn project(pool: &PgPool, owner: &User, name: &str) -> Project {
    ProjectRepo::create(
        pool,
        owner.id,
        &CreateProject {
            name: name.to_string(),
            address: Some("12 Gable Street".to_string()),
            roof_area: Some(180.0),
            roof_pitch: Some(6.0),
            estimated_cost: None,
        },
    )
    .await
    .unwrap()
}

pub async fn material(
    pool: &PgPool,
    name: &str,
    category: &str,
    edge: Option<f64>,
) -> PricingConfig {
    PricingConfigRepo::create(
        pool,
        &CreatePricingConfig {
            name: name.to_string(),
            category: category.to_string(),
            unit: None,
            unit_price: 12.5,
            length: edge,
            width: edge,
            height: edge,
        },
    )
    .await
    .unwrap()
}

pub async fn warehouse(pool: &PgPool, owner: &User, capacity: f64) -> Warehouse {
    WarehouseRepo::create(
        pool,
        owner.id,
        &CreateWarehouse {
            name: "North Yard".to_string(),
            address: None,
            capacity,
        },
    )
    .await
    .unwrap()
}

pub async fn stock(
    pool: &PgPool,
    warehouse: &Warehouse,
    material: &PricingConfig,
    quantity: i32,
) -> WarehouseMaterial {
    WarehouseMaterialRepo::add(
        pool,
        warehouse.id,
        &AddWarehouseMaterial {
            material_id: material.id,
            quantity,
        },
    )
    .await
    .unwrap()
}
