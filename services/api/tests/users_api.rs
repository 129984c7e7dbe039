//! User registration integration tests
//! Drive the real router against the in-memory store
mod common;

use axum::http::{Method, StatusCode};
use common::{create_test_app, send, FailingStore, Step};
use playlist_api::adapters::MemoryStore;
use playlist_core::ports::PlaylistStore;
use serde_json::json;
use std::sync::Arc;

fn register_body(display_name: &str) -> serde_json::Value {
    json!({
        "spotify_id": "spotify-user-1",
        "spotify_display_name": display_name,
        "spotify_email": "listener@example.com"
    })
}

/// Registering the same id twice succeeds both times and stores one row
#[tokio::test]
async fn test_register_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let app = create_test_app(store.clone());

    let (status, body) = send(&app, Method::POST, "/api/user/register", Some(register_body("Ann"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User registered");

    let (status, body) = send(&app, Method::POST, "/api/user/register", Some(register_body("Ann"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User already registered");

    assert_eq!(store.user_count().await, 1);
}

/// A changed display name upstream does not update the stored row
#[tokio::test]
async fn test_register_does_not_update_existing_user() {
    let store = Arc::new(MemoryStore::new());
    let app = create_test_app(store.clone());

    send(&app, Method::POST, "/api/user/register", Some(register_body("Ann"))).await;
    let (status, body) = send(&app, Method::POST, "/api/user/register", Some(register_body("Annie"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User already registered");
    let user = store.find_user("spotify-user-1").await.unwrap().unwrap();
    assert_eq!(user.name, "Ann");
}

/// A failed insert is still reported as a successful registration
#[tokio::test]
async fn test_register_ignores_insert_failure() {
    let memory = Arc::new(MemoryStore::new());
    let store = Arc::new(FailingStore::rejecting(memory.clone(), Step::InsertUser));
    let app = create_test_app(store);

    let (status, body) = send(&app, Method::POST, "/api/user/register", Some(register_body("Ann"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User registered");
    assert_eq!(memory.user_count().await, 0);
}

/// A failed lookup falls through to the insert
#[tokio::test]
async fn test_register_inserts_when_lookup_fails() {
    let memory = Arc::new(MemoryStore::new());
    let store = Arc::new(FailingStore::disconnecting(memory.clone(), Step::FindUser));
    let app = create_test_app(store);

    let (status, body) = send(&app, Method::POST, "/api/user/register", Some(register_body("Ann"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User registered");
    assert_eq!(memory.user_count().await, 1);
}

/// Missing profile fields do not block registration
#[tokio::test]
async fn test_register_accepts_missing_fields() {
    let store = Arc::new(MemoryStore::new());
    let app = create_test_app(store.clone());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/user/register",
        Some(json!({ "spotify_id": "spotify-user-1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User registered");
    let user = store.find_user("spotify-user-1").await.unwrap().unwrap();
    assert_eq!(user.name, "");
    assert_eq!(user.email, "");
}

/// A body that is not a JSON object is rejected before touching the store
#[tokio::test]
async fn test_register_rejects_non_object_body() {
    let store = Arc::new(MemoryStore::new());
    let app = create_test_app(store.clone());

    let (status, body) = send(&app, Method::POST, "/api/user/register", Some(json!("nope"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(store.user_count().await, 0);
}

/// The health check answers without a store round trip
#[tokio::test]
async fn test_health() {
    let memory = Arc::new(MemoryStore::new());
    let store = Arc::new(FailingStore::disconnecting(memory, Step::ListPlaylists));
    let app = create_test_app(store);

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "local");
}
