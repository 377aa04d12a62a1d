use axum::routing::{get, put};
use axum::Router;

use crate::handlers::pricing;
use crate::state::AppState;

/// Routes mounted at `/pricing`.
///
/// ```text
/// GET    /                          -> list_pricing
/// POST   /                          -> create_pricing
/// PUT    /{id}                      -> update_pricing
/// DELETE /{id}                      -> delete_pricing
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pricing::list_pricing).post(pricing::create_pricing))
        .route(
            "/{id}",
            put(pricing::update_pricing).delete(pricing::delete_pricing),
        )
}
