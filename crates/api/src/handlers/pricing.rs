//! Handlers for the `/pricing` resource (priced material SKUs).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use roofdesk_core::types::DbId;
use roofdesk_core::validation::validate_input;
use roofdesk_db::models::pricing::{CreatePricingConfig, PricingConfig, UpdatePricingConfig};
use roofdesk_db::repositories::PricingConfigRepo;
use serde::Serialize;

use crate::error::{not_found, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireInventoryManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// A pricing entry with its derived unit volume.
#[derive(Debug, Serialize)]
pub struct PricingView {
    #[serde(flatten)]
    pub config: PricingConfig,
    pub unit_volume: f64,
}

impl From<PricingConfig> for PricingView {
    fn from(config: PricingConfig) -> Self {
        let unit_volume = config.unit_volume();
        Self {
            config,
            unit_volume,
        }
    }
}

/// GET /api/v1/pricing
pub async fn list_pricing(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PricingView>>>> {
    let configs = PricingConfigRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: configs.into_iter().map(PricingView::from).collect(),
    }))
}

/// POST /api/v1/pricing
pub async fn create_pricing(
    RequireInventoryManager(_user): RequireInventoryManager,
    State(state): State<AppState>,
    Json(input): Json<CreatePricingConfig>,
) -> AppResult<(StatusCode, Json<DataResponse<PricingView>>)> {
    validate_input(&input)?;
    let config = PricingConfigRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: config.into() })))
}

/// PUT /api/v1/pricing/{id}
pub async fn update_pricing(
    RequireInventoryManager(_user): RequireInventoryManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePricingConfig>,
) -> AppResult<Json<DataResponse<PricingView>>> {
    validate_input(&input)?;
    let config = PricingConfigRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("Pricing config", id))?;
    Ok(Json(DataResponse { data: config.into() }))
}

/// DELETE /api/v1/pricing/{id}
///
/// Deactivates the entry. Stock rows referencing it stay in place.
pub async fn delete_pricing(
    RequireInventoryManager(_user): RequireInventoryManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !PricingConfigRepo::deactivate(&state.pool, id).await? {
        return Err(not_found("Pricing config", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
