// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use lockbox_agent::Dispatcher;
use lockbox_config::model::ServerConfig;
use lockbox_core::{LockboxError, MessageTransport, StorageAdapter};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, secret_token_middleware};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub dispatcher: Arc<Dispatcher>,
    /// Used for the degraded-service reply when dispatch fails.
    pub transport: Arc<dyn MessageTransport>,
    /// Probed by the health endpoint.
    pub storage: Arc<dyn StorageAdapter>,
}

/// Routes:
/// - `POST /` (secret token required)
/// - `GET /health` (public)
pub fn build_router(state: GatewayState, auth: AuthConfig) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let webhook_routes = Router::new()
        .route("/", post(handlers::post_update))
        .route_layer(axum_middleware::from_fn_with_state(
            auth,
            secret_token_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(webhook_routes)
        .layer(TraceLayer::new_for_http())
}

/// Serve until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    auth: AuthConfig,
    shutdown: CancellationToken,
) -> Result<(), LockboxError> {
    let app = build_router(state, auth);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| {
            LockboxError::transport(format!("failed to bind gateway to {addr}: {e}"), Some(Box::new(e)))
        })?;

    tracing::info!("webhook server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| LockboxError::transport(format!("gateway server error: {e}"), Some(Box::new(e))))?;

    Ok(())
}
