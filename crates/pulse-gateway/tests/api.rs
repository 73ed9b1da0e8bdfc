//! End-to-end gateway tests over an in-process HTTP server.

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use pulse_gateway::{create_router, GatewayConfig, GatewayState};
use pulse_store::RocksStore;
use pulse_sync::{CommandSyncService, SyncConfig};

fn make_server() -> (TestServer, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(RocksStore::open(dir.path()).unwrap());
    let sync = Arc::new(CommandSyncService::new(store, SyncConfig::default()).unwrap());
    let state = GatewayState::new(sync, GatewayConfig::default());
    let server = TestServer::new(create_router(state)).unwrap();
    (server, dir)
}

async fn admin_login(server: &TestServer) -> String {
    let response = server
        .post("/admin/login")
        .json(&json!({"username": "admin", "password": "blackingbr"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

async fn create_client(server: &TestServer, token: &str, username: &str) -> String {
    let response = server
        .post("/admin/clients")
        .authorization_bearer(token)
        .json(&json!({"username": username, "secret": "hunter2"}))
        .await;
    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    let id = body["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    id
}

#[tokio::test]
async fn health_is_public() {
    let (server, _dir) = make_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn poll_malformed_id_is_bad_request() {
    let (server, _dir) = make_server();
    let response = server
        .get("/command")
        .add_query_param("clientId", "has space")
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn poll_unknown_client_degrades_to_no_command() {
    let (server, _dir) = make_server();
    let response = server
        .get("/command")
        .add_query_param("clientId", "deadbeefdeadbeefdeadbeefdeadbeef")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["command"], Value::Null);
    assert_eq!(body["timestamp"], Value::Null);
}

#[tokio::test]
async fn submit_then_poll_roundtrip() {
    let (server, _dir) = make_server();
    let token = admin_login(&server).await;
    let id = create_client(&server, &token, "client01").await;

    let response = server
        .post("/command")
        .json(&json!({"clientId": id, "command": "START"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["command"], "start");
    assert!(body["timestamp"].is_i64());

    let response = server.get("/command").add_query_param("clientId", &id).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["command"], "start");
}

#[tokio::test]
async fn submit_unknown_client_is_not_found() {
    let (server, _dir) = make_server();
    let response = server
        .post("/command")
        .json(&json!({"clientId": "deadbeefdeadbeefdeadbeefdeadbeef", "command": "start"}))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn submit_empty_command_is_bad_request() {
    let (server, _dir) = make_server();
    let token = admin_login(&server).await;
    let id = create_client(&server, &token, "client01").await;

    let response = server
        .post("/command")
        .json(&json!({"clientId": id, "command": "   "}))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn submit_unknown_field_is_rejected() {
    let (server, _dir) = make_server();
    let response = server
        .post("/command")
        .json(&json!({"clientId": "abc", "command": "start", "extra": 1}))
        .await;
    // Strict schema: unknown shapes never reach the store.
    assert_eq!(response.status_code(), 422);
}

#[tokio::test]
async fn login_wrong_password_is_unauthorized() {
    let (server, _dir) = make_server();
    let response = server
        .post("/admin/login")
        .json(&json!({"username": "admin", "password": "wrong"}))
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn admin_surface_requires_token() {
    let (server, _dir) = make_server();

    let response = server.get("/admin/clients").await;
    assert_eq!(response.status_code(), 401);

    let response = server
        .post("/admin/clients")
        .json(&json!({"username": "client01", "secret": "hunter2"}))
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn client_session_cannot_use_admin_surface() {
    let (server, _dir) = make_server();
    let token = admin_login(&server).await;
    create_client(&server, &token, "client01").await;

    let response = server
        .post("/admin/login")
        .json(&json!({"username": "client01", "password": "hunter2"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let client_token = body["token"].as_str().unwrap().to_string();

    let response = server
        .get("/admin/clients")
        .authorization_bearer(&client_token)
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
    let (server, _dir) = make_server();
    let token = admin_login(&server).await;
    create_client(&server, &token, "client01").await;

    let response = server
        .post("/admin/clients")
        .authorization_bearer(&token)
        .json(&json!({"username": "client01", "secret": "other"}))
        .await;
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn listing_joins_latest_command() {
    let (server, _dir) = make_server();
    let token = admin_login(&server).await;
    let id = create_client(&server, &token, "client01").await;

    server
        .post("/command")
        .json(&json!({"clientId": id, "command": "stop"}))
        .await
        .assert_status_ok();

    let response = server
        .get("/admin/clients")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let clients = body["clients"].as_array().unwrap();
    assert_eq!(clients.len(), 2);
    assert_eq!(clients[0]["username"], "admin");
    assert_eq!(clients[1]["username"], "client01");
    assert_eq!(clients[1]["last_command"], "stop");
    assert!(clients[1]["last_timestamp"].is_string());
}

#[tokio::test]
async fn delete_client_lifecycle() {
    let (server, _dir) = make_server();
    let token = admin_login(&server).await;
    let id = create_client(&server, &token, "client01").await;

    server
        .post("/command")
        .json(&json!({"clientId": id, "command": "start"}))
        .await
        .assert_status_ok();

    let response = server
        .delete(&format!("/admin/clients/{id}"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 204);

    // The poll path degrades: the deleted client reads as uncommanded.
    let response = server.get("/command").add_query_param("clientId", &id).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["command"], Value::Null);

    // Writing to the deleted client is a hard 404.
    let response = server
        .post("/command")
        .json(&json!({"clientId": id, "command": "start"}))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn delete_admin_is_forbidden() {
    let (server, _dir) = make_server();
    let token = admin_login(&server).await;

    let response = server
        .get("/admin/clients")
        .authorization_bearer(&token)
        .await;
    let body: Value = response.json();
    let admin_id = body["clients"][0]["id"].as_str().unwrap().to_string();

    let response = server
        .delete(&format!("/admin/clients/{admin_id}"))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn delete_unknown_client_is_not_found() {
    let (server, _dir) = make_server();
    let token = admin_login(&server).await;

    let response = server
        .delete("/admin/clients/deadbeefdeadbeefdeadbeefdeadbeef")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let (server, _dir) = make_server();
    let token = admin_login(&server).await;

    let response = server
        .post("/admin/logout")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 204);

    let response = server
        .get("/admin/clients")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 401);

    // Logging out twice is fine.
    let response = server
        .post("/admin/logout")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 204);
}
