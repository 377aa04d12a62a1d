//! Shared harness for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use roofdesk_api::auth::jwt::{generate_access_token, JwtConfig};
use roofdesk_api::auth::password::hash_password;
use roofdesk_api::config::ServerConfig;
use roofdesk_api::router::build_app_router;
use roofdesk_api::state::AppState;
use roofdesk_core::roles::Role;
use roofdesk_db::models::pricing::{CreatePricingConfig, PricingConfig};
use roofdesk_db::models::user::{CreateUser, User};
use roofdesk_db::models::warehouse::{
    AddWarehouseMaterial, CreateWarehouse, Warehouse, WarehouseMaterial,
};
use roofdesk_db::repositories::{
    PricingConfigRepo, UserRepo, WarehouseMaterialRepo, WarehouseRepo,
};
use roofdesk_events::EventBus;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "shingle-and-tar";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Full application router over `pool`, same middleware stack as `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_bus(pool).0
}

/// Like [`build_test_app`], also returning the event bus so a test can
/// subscribe to what handlers publish.
pub fn build_test_app_with_bus(pool: PgPool) -> (Router, Arc<EventBus>) {
    let config = test_config();
    let bus = Arc::new(EventBus::default());
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&bus),
    };
    (build_app_router(state, &config), bus)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, email: &str, role: Role) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
            role: role.as_str().to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

pub fn token_for(user: &User) -> String {
    let role = Role::from_str_db(&user.role).expect("fixture role is valid");
    generate_access_token(user.id, role, &test_config().jwt).expect("token should encode")
}

pub async fn create_material(
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
            unit_price: 20.0,
            length: edge,
            width: edge,
            height: edge,
        },
    )
    .await
    .expect("pricing creation should succeed")
}

pub async fn create_warehouse(pool: &PgPool, owner: &User, capacity: f64) -> Warehouse {
    WarehouseRepo::create(
        pool,
        owner.id,
        &CreateWarehouse {
            name: "Depot".to_string(),
            address: Some("1 Yard Road".to_string()),
            capacity,
        },
    )
    .await
    .expect("warehouse creation should succeed")
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
    .expect("stocking should succeed")
}

pub async fn stock_quantity(pool: &PgPool, warehouse_material_id: i64) -> i32 {
    WarehouseMaterialRepo::find_by_id(pool, warehouse_material_id)
        .await
        .unwrap()
        .expect("stock row exists")
        .quantity
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}
