//! Shared helpers for the REST API integration tests.

// Not every test binary uses every helper
#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{Value, json};

use scifun_persistence::index::MemoryIndex;
use scifun_persistence::store::MemoryStore;
use scifun_rest::auth::issue_token;
use scifun_rest::{AppState, ServerConfig};

/// Creates a test server over in-memory backends, returning the backends
/// for direct seeding and inspection.
pub fn create_test_server() -> (TestServer, Arc<MemoryStore>, Arc<MemoryIndex>) {
    let store = Arc::new(MemoryStore::new());
    let index = Arc::new(MemoryIndex::new());

    let state = AppState::new(
        Arc::clone(&store),
        Arc::clone(&index),
        ServerConfig::for_testing(),
    );
    let app = scifun_rest::routes::create_routes(state);
    let server = TestServer::new(app).expect("Failed to create test server");

    (server, store, index)
}

/// Signs an admin access token for the test configuration.
pub fn admin_token() -> String {
    let config = ServerConfig::for_testing();
    issue_token(&config, "507f1f77bcf86cd799439011", "admin@scifun.vn", "ADMIN")
        .expect("Failed to sign admin token")
}

/// Signs a non-admin access token for the given user id.
pub fn user_token(user_id: &str) -> String {
    let config = ServerConfig::for_testing();
    issue_token(&config, user_id, "user@scifun.vn", "USER").expect("Failed to sign user token")
}

/// Creates a subject through the API and returns its id.
pub async fn seed_subject(server: &TestServer, name: &str) -> String {
    let response = server
        .post("/api/v1/subject/create-subject")
        .authorization_bearer(admin_token())
        .json(&json!({ "name": name, "code": "SCI", "description": "desc" }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["status"], 200, "seed subject failed: {body}");
    body["data"]["_id"]
        .as_str()
        .expect("subject id missing")
        .to_string()
}

/// Creates a topic under a subject through the API and returns its id.
pub async fn seed_topic(server: &TestServer, subject_id: &str, name: &str) -> String {
    let response = server
        .post("/api/v1/topic/create-topic")
        .authorization_bearer(admin_token())
        .json(&json!({ "name": name, "description": "desc", "subject": subject_id }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["status"], 200, "seed topic failed: {body}");
    body["data"]["_id"]
        .as_str()
        .expect("topic id missing")
        .to_string()
}

/// Creates a quiz under a topic through the API and returns its id.
pub async fn seed_quiz(server: &TestServer, topic_id: &str, title: &str) -> String {
    let response = server
        .post("/api/v1/quiz/create-quiz")
        .authorization_bearer(admin_token())
        .json(&json!({
            "title": title,
            "description": "desc",
            "duration": 15,
            "topic": topic_id,
        }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["status"], 200, "seed quiz failed: {body}");
    body["data"]["_id"]
        .as_str()
        .expect("quiz id missing")
        .to_string()
}
