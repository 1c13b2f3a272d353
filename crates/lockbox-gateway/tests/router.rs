// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router behaviour: authentication, acknowledgement and degraded replies.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use lockbox_agent::{Dispatcher, RevealScheduler, replies};
use lockbox_gateway::{AuthConfig, GatewayState, SECRET_TOKEN_HEADER, build_router};
use lockbox_test_utils::{MemoryStorage, MockTransport};
use lockbox_vault::EncryptionKey;
use tower::ServiceExt;

const SECRET: &str = "webhook-secret";

struct Fixture {
    storage: Arc<MemoryStorage>,
    transport: Arc<MockTransport>,
    router: axum::Router,
}

fn fixture(secret: Option<&str>) -> Fixture {
    let storage = Arc::new(MemoryStorage::new());
    let transport = Arc::new(MockTransport::new());
    let dispatcher = Dispatcher::new(
        storage.clone(),
        transport.clone(),
        RevealScheduler::new(transport.clone(), 20),
        EncryptionKey::generate().unwrap(),
    );
    let state = GatewayState {
        dispatcher: Arc::new(dispatcher),
        transport: transport.clone(),
        storage: storage.clone(),
    };
    let auth = AuthConfig {
        secret_token: secret.map(str::to_string),
    };
    Fixture {
        storage,
        transport,
        router: build_router(state, auth),
    }
}

fn update(text: &str) -> String {
    serde_json::json!({
        "update_id": 1,
        "message": {
            "message_id": 7,
            "date": 1_700_000_000,
            "chat": {"id": 42, "type": "private", "first_name": "Alice"},
            "from": {"id": 42, "is_bot": false, "first_name": "Alice", "username": "alice"},
            "text": text
        }
    })
    .to_string()
}

fn webhook_request(secret: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json");
    if let Some(secret) = secret {
        builder = builder.header(SECRET_TOKEN_HEADER, secret);
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn missing_secret_header_is_rejected() {
    let f = fixture(Some(SECRET));
    let response = f
        .router
        .oneshot(webhook_request(None, update("hi")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(f.transport.calls().await.is_empty());
}

#[tokio::test]
async fn wrong_secret_is_rejected() {
    let f = fixture(Some(SECRET));
    let response = f
        .router
        .oneshot(webhook_request(Some("guess"), update("hi")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unconfigured_secret_fails_closed() {
    let f = fixture(None);
    let response = f
        .router
        .oneshot(webhook_request(Some(""), update("hi")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authenticated_update_is_dispatched() {
    let f = fixture(Some(SECRET));
    let response = f
        .router
        .oneshot(webhook_request(Some(SECRET), update("hi")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let reply = f.transport.last_sent_text().await.unwrap();
    assert!(reply.contains("I'm a password manager bot"));
}

#[tokio::test]
async fn undecodable_update_is_acknowledged() {
    let f = fixture(Some(SECRET));
    let response = f
        .router
        .oneshot(webhook_request(Some(SECRET), "{\"update_id\": 1}".into()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(f.transport.calls().await.is_empty());
}

#[tokio::test]
async fn dispatch_failure_still_acknowledges_and_apologises() {
    let f = fixture(Some(SECRET));
    f.storage.set_failing(true);

    let response = f
        .router
        .oneshot(webhook_request(Some(SECRET), update("hi")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        f.transport.last_sent_text().await.as_deref(),
        Some(replies::TRY_AGAIN_LATER)
    );
}

#[tokio::test]
async fn health_reflects_storage() {
    let f = fixture(Some(SECRET));
    let ok = f
        .router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);

    f.storage.set_failing(true);
    let down = f
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = axum::body::to_bytes(down.into_body(), 1024).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "unhealthy");
}
