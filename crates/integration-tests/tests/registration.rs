//! Integration tests for single-user registration.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::StatusCode;
use rollcall_integration_tests::TestServer;
use serde_json::{Value, json};
use uuid::Uuid;

#[tokio::test]
async fn test_health() {
    let server = TestServer::spawn().await;

    let resp = server.client.get(server.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_register_user_round_trip() {
    let server = TestServer::spawn().await;

    let resp = server
        .client
        .post(server.url("/api/registerUser"))
        .json(&json!({"name": "Dana", "email": "dana@example.com", "phone": "5551234"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "Dana");
    assert_eq!(body["email"], "dana@example.com");
    assert_eq!(body["phone"], "5551234");
    let user_id = Uuid::parse_str(body["userId"].as_str().unwrap()).unwrap();

    let stored = server.store.snapshot();
    assert_eq!(stored.len(), 1);
    assert_eq!(*stored[0].user_id.as_uuid(), user_id);
}

#[tokio::test]
async fn test_register_user_rejections_leave_store_untouched() {
    let server = TestServer::spawn().await;

    for (request, message) in [
        (json!({"email": "x@y.com"}), "Name is required"),
        (json!({"name": "Eve", "email": "", "phone": ""}), "At least email or phone is required"),
        (json!({"name": "Eve", "email": "eve@localhost"}), "Invalid email format"),
        (json!({"name": "Eve", "phone": "+1 415 555"}), "Invalid phone format"),
    ] {
        let resp = server
            .client
            .post(server.url("/api/registerUser"))
            .json(&request)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{request}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({"error": message}));
    }

    assert!(server.store.is_empty());
}

#[tokio::test]
async fn test_concurrent_registrations_get_unique_ids() {
    let server = TestServer::spawn().await;

    let requests = (0..20).map(|i| {
        let client = server.client.clone();
        let url = server.url("/api/registerUser");
        tokio::spawn(async move {
            let resp = client
                .post(url)
                .json(&json!({"name": format!("User {i}"), "phone": format!("55500{i:02}")}))
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            resp.json::<Value>().await.unwrap()["userId"]
                .as_str()
                .unwrap()
                .to_string()
        })
    });

    let mut ids = Vec::new();
    for handle in requests.collect::<Vec<_>>() {
        ids.push(handle.await.unwrap());
    }
    ids.sort();
    ids.dedup();

    assert_eq!(ids.len(), 20);
    assert_eq!(server.store.len(), 20);
}
