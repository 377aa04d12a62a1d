use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool is reference counted and everything else is
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: roofdesk_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Workflow handlers publish notices here; the dispatcher consumes them.
    pub event_bus: Arc<roofdesk_events::EventBus>,
}
