use axum::routing::{get, post};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST   /                          -> create_user (developer)
/// GET    /me                        -> me
/// GET    /contractors               -> list_contractors
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(user::create_user))
        .route("/me", get(user::me))
        .route("/contractors", get(user::list_contractors))
}
