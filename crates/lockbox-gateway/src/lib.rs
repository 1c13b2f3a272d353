// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook gateway for Lockbox.
//!
//! Telegram delivers updates to `POST /`. Requests are authenticated with
//! the shared secret header, decoded, and handed to the
//! [`lockbox_agent::Dispatcher`]. Every authenticated delivery is
//! acknowledged with `200 OK`, including ones whose dispatch failed, so that
//! Telegram does not redeliver them.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::{AuthConfig, SECRET_TOKEN_HEADER};
pub use server::{GatewayState, build_router, start_server};
