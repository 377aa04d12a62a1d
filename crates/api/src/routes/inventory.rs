use axum::routing::get;
use axum::Router;

use crate::handlers::inventory;
use crate::state::AppState;

/// Routes mounted at `/inventory`.
///
/// ```text
/// GET    /warnings                  -> list_warnings
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/warnings", get(inventory::list_warnings))
}
