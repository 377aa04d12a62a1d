//! Handlers for the `/warehouses` resource and its stock rows.
//!
//! ADMIN callers manage the warehouses they own; DEVELOPER callers manage
//! all of them. A warehouse outside the caller's reach is reported missing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use roofdesk_core::error::CoreError;
use roofdesk_core::materials::{
    capacity_usage, replenish_quantity, CapacityUsage, MaterialCategory, MaterialShortage,
    RequiredMaterial,
};
use roofdesk_core::types::DbId;
use roofdesk_core::validation::validate_input;
use roofdesk_db::models::warehouse::{
    AddWarehouseMaterial, CreateWarehouse, SetQuantity, StockedMaterial, UpdateWarehouse,
    Warehouse, WarehouseMaterial,
};
use roofdesk_db::repositories::{PricingConfigRepo, WarehouseMaterialRepo, WarehouseRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::ledger;
use crate::error::{not_found, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireInventoryManager;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CapacityResponse {
    pub warehouse_id: DbId,
    #[serde(flatten)]
    pub usage: CapacityUsage,
}

#[derive(Debug, Serialize)]
pub struct ReplenishResponse {
    pub warehouse_material_id: DbId,
    pub material_id: DbId,
    pub category: String,
    /// Units added by this replenishment. May be 0 when the warehouse is full.
    pub added: i32,
    pub quantity: i32,
    /// Usage before the units were added.
    pub capacity: CapacityUsage,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SufficiencyRequest {
    #[validate(length(min = 1, message = "must list at least one material"))]
    #[validate(nested)]
    pub materials: Vec<RequiredMaterial>,
}

#[derive(Debug, Serialize)]
pub struct SufficiencyReport {
    pub sufficient: bool,
    pub shortages: Vec<MaterialShortage>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_managed(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Warehouse> {
    WarehouseRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|w| user.is_developer() || w.owner_id == user.user_id)
        .ok_or_else(|| not_found("Warehouse", id))
}

fn usage_of(warehouse: &Warehouse, stocked: &[StockedMaterial]) -> CapacityUsage {
    capacity_usage(
        warehouse.capacity,
        stocked.iter().map(|m| (m.quantity, m.unit_volume())),
    )
}

// ---------------------------------------------------------------------------
// Warehouse CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/warehouses
pub async fn list_warehouses(
    RequireInventoryManager(user): RequireInventoryManager,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Warehouse>>>> {
    let owner = (!user.is_developer()).then_some(user.user_id);
    let warehouses = WarehouseRepo::list(&state.pool, owner).await?;
    Ok(Json(DataResponse { data: warehouses }))
}

/// POST /api/v1/warehouses
pub async fn create_warehouse(
    RequireInventoryManager(user): RequireInventoryManager,
    State(state): State<AppState>,
    Json(input): Json<CreateWarehouse>,
) -> AppResult<(StatusCode, Json<DataResponse<Warehouse>>)> {
    validate_input(&input)?;
    let warehouse = WarehouseRepo::create(&state.pool, user.user_id, &input).await?;
    tracing::info!(warehouse_id = warehouse.id, owner_id = user.user_id, "Warehouse created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: warehouse })))
}

/// GET /api/v1/warehouses/{id}
pub async fn get_warehouse(
    RequireInventoryManager(user): RequireInventoryManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Warehouse>>> {
    let warehouse = load_managed(&state, &user, id).await?;
    Ok(Json(DataResponse { data: warehouse }))
}

/// PUT /api/v1/warehouses/{id}
pub async fn update_warehouse(
    RequireInventoryManager(user): RequireInventoryManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWarehouse>,
) -> AppResult<Json<DataResponse<Warehouse>>> {
    validate_input(&input)?;
    load_managed(&state, &user, id).await?;
    let warehouse = WarehouseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("Warehouse", id))?;
    Ok(Json(DataResponse { data: warehouse }))
}

/// DELETE /api/v1/warehouses/{id}
///
/// Deactivates the warehouse; its rows stay for the ledger's history.
pub async fn delete_warehouse(
    RequireInventoryManager(user): RequireInventoryManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_managed(&state, &user, id).await?;
    if !WarehouseRepo::deactivate(&state.pool, id).await? {
        return Err(not_found("Warehouse", id));
    }
    tracing::info!(warehouse_id = id, "Warehouse deactivated");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Stock rows
// ---------------------------------------------------------------------------

/// GET /api/v1/warehouses/{id}/materials
pub async fn list_materials(
    RequireInventoryManager(user): RequireInventoryManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<StockedMaterial>>>> {
    load_managed(&state, &user, id).await?;
    let stocked = WarehouseMaterialRepo::list_for_warehouse(&state.pool, id).await?;
    Ok(Json(DataResponse { data: stocked }))
}

/// POST /api/v1/warehouses/{id}/materials
///
/// Start stocking a priced material. 409 if the warehouse already stocks it.
pub async fn add_material(
    RequireInventoryManager(user): RequireInventoryManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AddWarehouseMaterial>,
) -> AppResult<(StatusCode, Json<DataResponse<WarehouseMaterial>>)> {
    validate_input(&input)?;
    load_managed(&state, &user, id).await?;

    PricingConfigRepo::find_by_id(&state.pool, input.material_id)
        .await?
        .filter(|m| m.is_active)
        .ok_or_else(|| not_found("Material", input.material_id))?;

    let row = WarehouseMaterialRepo::add(&state.pool, id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: row })))
}

/// PUT /api/v1/warehouses/{id}/materials/{material_id}
///
/// Overwrite the on-hand quantity (stock count correction).
pub async fn set_material_quantity(
    RequireInventoryManager(user): RequireInventoryManager,
    State(state): State<AppState>,
    Path((id, material_id)): Path<(DbId, DbId)>,
    Json(input): Json<SetQuantity>,
) -> AppResult<Json<DataResponse<WarehouseMaterial>>> {
    validate_input(&input)?;
    load_managed(&state, &user, id).await?;

    let row = WarehouseMaterialRepo::set_quantity(&state.pool, id, material_id, input.quantity)
        .await?
        .ok_or_else(|| not_found("Warehouse material", material_id))?;
    tracing::info!(
        warehouse_id = id,
        material_id,
        quantity = input.quantity,
        "Stock quantity set"
    );
    Ok(Json(DataResponse { data: row }))
}

/// POST /api/v1/warehouses/{id}/materials/{material_id}/replenish
///
/// Add the category's restock quantity, clamped to half of the remaining
/// volume.
pub async fn replenish_material(
    RequireInventoryManager(user): RequireInventoryManager,
    State(state): State<AppState>,
    Path((id, material_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<ReplenishResponse>>> {
    let warehouse = load_managed(&state, &user, id).await?;
    let target = WarehouseMaterialRepo::find_stocked(&state.pool, id, material_id)
        .await?
        .ok_or_else(|| not_found("Warehouse material", material_id))?;

    let stocked = WarehouseMaterialRepo::list_for_warehouse(&state.pool, id).await?;
    let usage = usage_of(&warehouse, &stocked);
    let added = replenish_quantity(
        MaterialCategory::from_label(&target.category),
        target.unit_volume(),
        &usage,
    );

    if added > 0 {
        let mut conn = state.pool.acquire().await?;
        if !WarehouseMaterialRepo::adjust_quantity(&mut conn, target.id, added).await? {
            return Err(AppError::Core(CoreError::Conflict(
                "Stock row changed during replenishment".into(),
            )));
        }
    }

    tracing::info!(
        warehouse_id = id,
        material_id,
        added,
        remaining_capacity = usage.remaining,
        "Material replenished"
    );

    Ok(Json(DataResponse {
        data: ReplenishResponse {
            warehouse_material_id: target.id,
            material_id,
            category: target.category,
            added,
            quantity: target.quantity + added,
            capacity: usage,
        },
    }))
}

/// GET /api/v1/warehouses/{id}/capacity
pub async fn get_capacity(
    RequireInventoryManager(user): RequireInventoryManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CapacityResponse>>> {
    let warehouse = load_managed(&state, &user, id).await?;
    let stocked = WarehouseMaterialRepo::list_for_warehouse(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: CapacityResponse {
            warehouse_id: id,
            usage: usage_of(&warehouse, &stocked),
        },
    }))
}

/// POST /api/v1/warehouses/{id}/check-sufficiency
///
/// Report which of the listed materials the warehouse cannot cover.
pub async fn check_sufficiency(
    RequireInventoryManager(user): RequireInventoryManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SufficiencyRequest>,
) -> AppResult<Json<DataResponse<SufficiencyReport>>> {
    validate_input(&input)?;
    load_managed(&state, &user, id).await?;

    let shortages = ledger::shortages(&state, id, &input.materials).await?;
    Ok(Json(DataResponse {
        data: SufficiencyReport {
            sufficient: shortages.is_empty(),
            shortages,
        },
    }))
}
