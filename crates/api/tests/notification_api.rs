//! Workflow notices flowing through the bus into notification rows, and the
//! `/notifications` endpoints that read them back.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_user, delete_auth, get_auth, post_auth, post_json_auth, token_for};
use roofdesk_api::notifications::NotificationDispatcher;
use roofdesk_core::roles::Role;
use roofdesk_events::notice::PROJECT_SENT_TO_CONTRACTOR;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn send_to_contractor_notifies_the_contractor(pool: PgPool) {
    let client = create_user(&pool, "client@roof.test", Role::Client).await;
    let contractor = create_user(&pool, "crew@roof.test", Role::Admin).await;
    let (app, bus) = common::build_test_app_with_bus(pool.clone());
    let mut events = bus.subscribe();

    let client_token = token_for(&client);
    let crew_token = token_for(&contractor);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/projects",
        json!({ "name": "Birch Rd" }),
        &client_token,
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/projects/{id}/send-to-contractor"),
        json!({ "contractor_id": contractor.id }),
        &client_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let event = events.recv().await.expect("a notice should be published");
    assert_eq!(event.event_type, PROJECT_SENT_TO_CONTRACTOR);
    assert_eq!(event.entity_id, Some(id));
    assert_eq!(event.actor_user_id, Some(client.id));

    let dispatcher = NotificationDispatcher::new(pool.clone(), None);
    let stored = dispatcher
        .dispatch(&event)
        .await
        .unwrap()
        .expect("project events produce a row");
    assert_eq!(stored.user_id, contractor.id);
    assert_eq!(stored.project_id, Some(id));

    // The client hears nothing about their own action.
    let response = get_auth(app.clone(), "/api/v1/notifications", &client_token).await;
    assert_eq!(body_json(response).await["data"], json!([]));

    let response = get_auth(app.clone(), "/api/v1/notifications", &crew_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["title"], "New quote request");
    assert_eq!(json["data"][0]["project_name"], "Birch Rd");
    assert_eq!(json["data"][0]["is_read"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn read_and_delete_lifecycle(pool: PgPool) {
    let client = create_user(&pool, "client@roof.test", Role::Client).await;
    let contractor = create_user(&pool, "crew@roof.test", Role::Admin).await;
    let (app, bus) = common::build_test_app_with_bus(pool.clone());
    let mut events = bus.subscribe();
    let dispatcher = NotificationDispatcher::new(pool.clone(), None);

    let client_token = token_for(&client);
    let crew_token = token_for(&contractor);

    // Two projects sent to the same contractor.
    for name in ["First", "Second"] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/projects",
            json!({ "name": name }),
            &client_token,
        )
        .await;
        let id = body_json(response).await["data"]["id"].as_i64().unwrap();
        post_json_auth(
            app.clone(),
            &format!("/api/v1/projects/{id}/send-to-contractor"),
            json!({ "contractor_id": contractor.id }),
            &client_token,
        )
        .await;
        let event = events.recv().await.unwrap();
        dispatcher.dispatch(&event).await.unwrap();
    }

    let response = get_auth(app.clone(), "/api/v1/notifications/unread-count", &crew_token).await;
    assert_eq!(body_json(response).await["data"]["count"], 2);

    let response = get_auth(app.clone(), "/api/v1/notifications?limit=1", &crew_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    let first = json["data"][0]["id"].as_i64().unwrap();

    // Another user cannot touch it.
    let response = post_auth(
        app.clone(),
        &format!("/api/v1/notifications/{first}/read"),
        &client_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/notifications/{first}/read"),
        &crew_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(
        app.clone(),
        "/api/v1/notifications?unread_only=true",
        &crew_token,
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    // Bulk delete of read rows keeps the unread one.
    let response = delete_auth(
        app.clone(),
        "/api/v1/notifications?read_only=true",
        &crew_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["deleted"], 1);

    let response = post_auth(app.clone(), "/api/v1/notifications/read-all", &crew_token).await;
    assert_eq!(body_json(response).await["data"]["marked_read"], 1);

    let response = get_auth(app.clone(), "/api/v1/notifications", &crew_token).await;
    let remaining = body_json(response).await["data"][0]["id"].as_i64().unwrap();
    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/notifications/{remaining}"),
        &crew_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, "/api/v1/notifications/unread-count", &crew_token).await;
    assert_eq!(body_json(response).await["data"]["count"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn activity_log_is_private_to_its_user(pool: PgPool) {
    let client = create_user(&pool, "client@roof.test", Role::Client).await;
    let other = create_user(&pool, "other@roof.test", Role::Client).await;
    let dev = create_user(&pool, "dev@roof.test", Role::Developer).await;
    let app = common::build_test_app(pool);
    let token = token_for(&client);

    post_json_auth(app.clone(), "/api/v1/projects", json!({ "name": "Porch" }), &token).await;

    let response = get_auth(app.clone(), "/api/v1/activities", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["activity_type"], "project.created");

    let uri = format!("/api/v1/activities?user_id={}", client.id);
    let response = get_auth(app.clone(), &uri, &token_for(&other)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, &uri, &token_for(&dev)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}
