// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: webhook requests through the gateway, the dispatcher
//! and a real SQLite database, with a recording transport.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use lockbox_agent::{Dispatcher, RevealScheduler, replies};
use lockbox_config::model::StorageConfig;
use lockbox_core::{MessageId, StorageAdapter, UserId};
use lockbox_gateway::{AuthConfig, GatewayState, SECRET_TOKEN_HEADER, build_router};
use lockbox_storage::SqliteStorage;
use lockbox_test_utils::{MockTransport, TransportCall};
use lockbox_vault::EncryptionKey;
use tempfile::TempDir;
use tower::ServiceExt;

const SECRET: &str = "e2e-secret";
const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

struct Harness {
    storage: Arc<SqliteStorage>,
    transport: Arc<MockTransport>,
    reveals: RevealScheduler,
    router: axum::Router,
    next_update: std::sync::atomic::AtomicI32,
    _dir: TempDir,
}

impl Harness {
    async fn new(auto_delete_secs: u64) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("lockbox.db").display().to_string(),
            ..StorageConfig::default()
        }));
        storage.initialize().await.unwrap();

        let transport = Arc::new(MockTransport::new());
        let reveals = RevealScheduler::new(transport.clone(), auto_delete_secs);
        let dispatcher = Dispatcher::new(
            storage.clone(),
            transport.clone(),
            reveals.clone(),
            EncryptionKey::from_bytes(KEY).unwrap(),
        );
        let router = build_router(
            GatewayState {
                dispatcher: Arc::new(dispatcher),
                transport: transport.clone(),
                storage: storage.clone(),
            },
            AuthConfig {
                secret_token: Some(SECRET.into()),
            },
        );

        Self {
            storage,
            transport,
            reveals,
            router,
            next_update: std::sync::atomic::AtomicI32::new(1),
            _dir: dir,
        }
    }

    async fn send(&self, text: &str) -> StatusCode {
        let id = self
            .next_update
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let body = serde_json::json!({
            "update_id": id,
            "message": {
                "message_id": id,
                "date": 1_700_000_000,
                "chat": {"id": 42, "type": "private", "first_name": "Alice"},
                "from": {"id": 42, "is_bot": false, "first_name": "Alice", "username": "alice"},
                "text": text
            }
        });
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .header(SECRET_TOKEN_HEADER, SECRET)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap().status()
    }

    async fn last(&self) -> String {
        self.transport.last_sent_text().await.unwrap()
    }

    async fn state(&self) -> String {
        self.storage
            .get_state(UserId(42))
            .await
            .unwrap()
            .map(|r| r.state)
            .unwrap_or_default()
    }
}

#[tokio::test]
async fn full_conversation_over_http() {
    let h = Harness::new(20).await;

    assert_eq!(h.send("/start").await, StatusCode::OK);
    assert!(h.last().await.contains("Enter your security password:"));
    assert_eq!(h.state().await, "setToken");

    h.send("my master token").await;
    assert_eq!(h.last().await, replies::TOKEN_SAVED);

    for step in ["1", "github", "alice", "p@ss"] {
        assert_eq!(h.send(step).await, StatusCode::OK);
    }
    assert!(h.last().await.contains("Password: `p@ss`"));
    assert_eq!(h.state().await, "default");

    h.send("2").await;
    h.send("my master token").await;
    assert_eq!(h.last().await, replies::ASK_SERVICE_AFTER_CHECK);
    assert_eq!(h.state().await, "getService");

    h.send("github").await;
    assert_eq!(
        h.last().await,
        "Your credentials for github:\nUsername: `alice`\nPassword: `p@ss`"
    );
    assert_eq!(h.reveals.pending(), 2);
}

#[tokio::test]
async fn secrets_are_encrypted_on_disk() {
    let h = Harness::new(20).await;
    for step in ["/start", "my master token", "1", "github", "alice", "p@ss"] {
        h.send(step).await;
    }

    let user = h.storage.get_user(UserId(42)).await.unwrap().unwrap();
    assert!(!contains(&user.encrypted_token, b"my master token"));

    let credential = h
        .storage
        .get_credential(UserId(42), "github")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(credential.username.as_deref(), Some("alice"));
    assert!(!contains(credential.encrypted_password.as_deref().unwrap(), b"p@ss"));
}

#[tokio::test]
async fn changing_the_token_wipes_stored_services() {
    let h = Harness::new(20).await;
    h.send("/start").await;
    h.send("first").await;
    for service in ["a", "b", "c"] {
        for step in ["1", service, "user", "pass"] {
            h.send(step).await;
        }
    }
    assert_eq!(h.storage.list_services(UserId(42), 50).await.unwrap().len(), 3);

    for step in ["4", "Yes", "second"] {
        h.send(step).await;
    }

    assert_eq!(h.last().await, replies::TOKEN_UPDATED);
    assert!(h.storage.list_services(UserId(42), 50).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn revealed_message_is_deleted_after_countdown() {
    let h = Harness::new(3).await;
    for step in ["/start", "token", "1", "github", "alice", "p@ss"] {
        h.send(step).await;
    }

    let revealed: Vec<MessageId> = h
        .transport
        .calls()
        .await
        .into_iter()
        .filter_map(|call| match call {
            TransportCall::Sent {
                message_id, text, ..
            } if text.starts_with("Successfully saved") => Some(message_id),
            _ => None,
        })
        .collect();
    assert_eq!(revealed.len(), 1);

    tokio::time::sleep(Duration::from_secs(4)).await;

    assert_eq!(h.transport.deleted().await, revealed);
    assert_eq!(h.transport.edits_of(revealed[0]).await.len(), 3);
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
