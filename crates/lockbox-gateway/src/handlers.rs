// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handlers: webhook delivery and health.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lockbox_agent::replies;
use lockbox_core::{HealthStatus, SendOptions};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// POST / -- one Telegram update.
///
/// Always answers `200 OK` once authenticated.
pub async fn post_update(State(state): State<GatewayState>, body: Bytes) -> StatusCode {
    let Some(msg) = lockbox_telegram::decode_payload(&body) else {
        return StatusCode::OK;
    };

    debug!(user_id = %msg.sender_id, chat_id = %msg.chat_id, "update received");

    if let Err(e) = state.dispatcher.dispatch(&msg).await {
        error!(
            user_id = %msg.sender_id,
            chat_id = %msg.chat_id,
            error = %e,
            "failed to handle message"
        );
        if let Err(e) = state
            .transport
            .send(msg.chat_id, replies::TRY_AGAIN_LATER, SendOptions::default())
            .await
        {
            warn!(chat_id = %msg.chat_id, error = %e, "failed to send degraded-service reply");
        }
    }

    StatusCode::OK
}

/// GET /health -- storage reachability.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let version = env!("CARGO_PKG_VERSION");
    let (code, status, detail) = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy", None),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, "degraded", Some(reason)),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(reason))
        }
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "unhealthy",
            Some(e.to_string()),
        ),
    };

    (
        code,
        Json(HealthResponse {
            status,
            version,
            detail,
        }),
    )
        .into_response()
}
