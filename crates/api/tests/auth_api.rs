//! HTTP-level tests for login, registration and account endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_user, get, get_auth, post_json, post_json_auth, token_for, TEST_PASSWORD,
};
use roofdesk_core::roles::Role;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn login_returns_token_and_user(pool: PgPool) {
    let user = create_user(&pool, "crew@roof.test", Role::Admin).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "email": "crew@roof.test", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["expires_in"], 3600);
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], "ADMIN");
    assert!(json["user"].get("password_hash").is_none());

    let token = json["access_token"].as_str().unwrap();
    let response = get_auth(app, "/api/v1/users/me", token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["email"], "crew@roof.test");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bad_credentials_are_unauthorized(pool: PgPool) {
    create_user(&pool, "crew@roof.test", Role::Admin).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "email": "crew@roof.test", "password": "wrong-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "email": "nobody@roof.test", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get(app.clone(), "/api/v1/users/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/api/v1/users/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_defaults_to_client_and_rejects_developer(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({ "name": "Dana", "email": "dana@roof.test", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["user"]["role"], "CLIENT");

    let response = post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({ "name": "Dana", "email": "dana@roof.test", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({
            "name": "Eve",
            "email": "eve@roof.test",
            "password": TEST_PASSWORD,
            "role": "DEVELOPER",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({ "name": "Sam", "email": "sam@roof.test", "password": "short" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn developers_create_accounts_and_list_contractors(pool: PgPool) {
    let dev = create_user(&pool, "dev@roof.test", Role::Developer).await;
    let client = create_user(&pool, "client@roof.test", Role::Client).await;
    let app = common::build_test_app(pool);

    let body = json!({
        "name": "Roof Crew",
        "email": "crew@roof.test",
        "password": TEST_PASSWORD,
        "role": "ADMIN",
    });
    let response = post_json_auth(
        app.clone(),
        "/api/v1/users",
        body.clone(),
        &token_for(&client),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(app.clone(), "/api/v1/users", body, &token_for(&dev)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(app, "/api/v1/users/contractors", &token_for(&client)).await;
    let json = body_json(response).await;
    let contractors = json["data"].as_array().unwrap();
    assert_eq!(contractors.len(), 1);
    assert_eq!(contractors[0]["email"], "crew@roof.test");
}
