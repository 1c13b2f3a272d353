// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Lockbox crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identity of a chat user as assigned by the chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Identity of a chat (private or group) on the chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Identifier of a message, unique within its chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i32);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Transport,
    Storage,
}

// --- Transport types ---

/// A decoded inbound chat message, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender_id: UserId,
    /// Platform username of the sender, if they have one.
    pub sender_username: Option<String>,
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: String,
    /// Bot command without the leading slash or `@botname` suffix.
    pub command: Option<String>,
}

/// A message that the transport has delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Text formatting requested for an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ParseMode {
    MarkdownV2,
    Html,
}

/// A quick-reply keyboard: rows of button labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<String>>,
}

impl Keyboard {
    pub fn new<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// All button labels, row by row.
    pub fn buttons(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(String::as_str)
    }
}

/// Options attached to an outbound send or edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub parse_mode: Option<ParseMode>,
    pub reply_markup: Option<Keyboard>,
    pub reply_to: Option<MessageId>,
}

impl SendOptions {
    pub fn with_keyboard(keyboard: Keyboard) -> Self {
        Self {
            reply_markup: Some(keyboard),
            ..Self::default()
        }
    }

    pub fn markdown() -> Self {
        Self {
            parse_mode: Some(ParseMode::MarkdownV2),
            ..Self::default()
        }
    }
}

// --- Persistence records ---

/// Row of the `users` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: UserId,
    /// `nonce || ciphertext || tag` of the master token.
    pub encrypted_token: Vec<u8>,
}

/// Row of the `credentials` collection.
///
/// `username` and `encrypted_password` stay `None` until the corresponding
/// step of the set flow has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub user_id: UserId,
    pub service_name: String,
    pub username: Option<String>,
    pub encrypted_password: Option<Vec<u8>>,
}

/// Row of the `state` collection, in its persisted string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRecord {
    pub user_id: UserId,
    pub state: String,
    pub last_service: String,
}
