//! Route definitions for the `/warehouses` resource.
//!
//! Restricted to inventory managers (ADMIN and DEVELOPER).

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::warehouse;
use crate::state::AppState;

/// Routes mounted at `/warehouses`.
///
/// ```text
/// GET    /                                      -> list_warehouses
/// POST   /                                      -> create_warehouse
/// GET    /{id}                                  -> get_warehouse
/// PUT    /{id}                                  -> update_warehouse
/// DELETE /{id}                                  -> delete_warehouse
/// GET    /{id}/materials                        -> list_materials
/// POST   /{id}/materials                        -> add_material
/// PUT    /{id}/materials/{material_id}          -> set_material_quantity
/// POST   /{id}/materials/{material_id}/replenish -> replenish_material
/// GET    /{id}/capacity                         -> get_capacity
/// POST   /{id}/check-sufficiency                -> check_sufficiency
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(warehouse::list_warehouses).post(warehouse::create_warehouse),
        )
        .route(
            "/{id}",
            get(warehouse::get_warehouse)
                .put(warehouse::update_warehouse)
                .delete(warehouse::delete_warehouse),
        )
        .route(
            "/{id}/materials",
            get(warehouse::list_materials).post(warehouse::add_material),
        )
        .route(
            "/{id}/materials/{material_id}",
            put(warehouse::set_material_quantity),
        )
        .route(
            "/{id}/materials/{material_id}/replenish",
            post(warehouse::replenish_material),
        )
        .route("/{id}/capacity", get(warehouse::get_capacity))
        .route(
            "/{id}/check-sufficiency",
            post(warehouse::check_sufficiency),
        )
}
