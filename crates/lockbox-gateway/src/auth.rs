// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared-secret middleware for the webhook route.
//!
//! Telegram echoes the `secret_token` given to `setWebhook` in the
//! [`SECRET_TOKEN_HEADER`] header of every delivery. When no secret is
//! configured, all requests are rejected (fail-closed).

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Authentication configuration for the webhook route.
#[derive(Clone)]
pub struct AuthConfig {
    /// Expected header value. `None` rejects everything.
    pub secret_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "secret_token",
                &self.secret_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

pub async fn secret_token_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = auth.secret_token.as_deref().filter(|s| !s.is_empty()) else {
        tracing::error!("webhook secret token is not configured -- rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let provided = request
        .headers()
        .get(SECRET_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    if provided == Some(expected) {
        return Ok(next.run(request).await);
    }

    tracing::warn!(
        header_present = provided.is_some(),
        "rejecting webhook request with wrong secret token"
    );
    Err(StatusCode::UNAUTHORIZED)
}
