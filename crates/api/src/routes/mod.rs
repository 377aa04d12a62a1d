pub mod activity;
pub mod auth;
pub mod health;
pub mod inventory;
pub mod notification;
pub mod pricing;
pub mod project;
pub mod user;
pub mod warehouse;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/register                                   register (public)
///
/// /users                                           create (developer)
/// /users/me                                        current user
/// /users/contractors                               active contractors
///
/// /projects                                        list, create
/// /projects/{id}                                   get, update, soft delete
/// /projects/{id}/restore                           restore archived (POST)
/// /projects/{id}/permanent                         hard delete archived (DELETE)
/// /projects/{id}/activate                          DRAFT -> ACTIVE
/// /projects/{id}/send-to-contractor                assign contractor
/// /projects/{id}/review                            contractor review
/// /projects/{id}/proposal                          send proposal
/// /projects/{id}/accept                            accept, reserve materials
/// /projects/{id}/decline                           decline proposal
/// /projects/{id}/revise                            request revision
/// /projects/{id}/start                             start work
/// /projects/{id}/finish                            finish, consume materials
/// /projects/{id}/archive                           archive
/// /projects/{id}/unarchive                         unarchive
/// /projects/{id}/materials                         list, reserve
/// /projects/{id}/materials/return                  return to stock
///
/// /warehouses                                      list, create (inventory managers)
/// /warehouses/{id}                                 get, update, deactivate
/// /warehouses/{id}/materials                       list, add stock row
/// /warehouses/{id}/materials/{material_id}         set quantity (PUT)
/// /warehouses/{id}/materials/{material_id}/replenish  restock (POST)
/// /warehouses/{id}/capacity                        volume usage
/// /warehouses/{id}/check-sufficiency               shortage report (POST)
///
/// /inventory/warnings                              low-stock warnings
///
/// /pricing                                         list, create
/// /pricing/{id}                                    update, deactivate
///
/// /notifications                                   list, bulk delete
/// /notifications/unread-count                      unread count
/// /notifications/read-all                          mark all read (POST)
/// /notifications/{id}                              delete
/// /notifications/{id}/read                         mark read (POST)
///
/// /activities                                      activity log
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", user::router())
        // Project CRUD, workflow transitions and material ledger.
        .nest("/projects", project::router())
        .nest("/warehouses", warehouse::router())
        .nest("/inventory", inventory::router())
        .nest("/pricing", pricing::router())
        .nest("/notifications", notification::router())
        .nest("/activities", activity::router())
}
