//! Route definitions for `/auth`. Both endpoints are public.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// ```text
/// POST   /login                     -> login
/// POST   /register                  -> register
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
}
