// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound chat transport capability.

use async_trait::async_trait;

use crate::error::LockboxError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatId, MessageId, SendOptions, SentMessage};

/// Sends, edits and deletes chat messages.
///
/// The dispatcher and the reveal countdown are the only callers.
#[async_trait]
pub trait MessageTransport: PluginAdapter {
    async fn send(
        &self,
        chat_id: ChatId,
        text: &str,
        options: SendOptions,
    ) -> Result<SentMessage, LockboxError>;

    async fn edit(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        options: SendOptions,
    ) -> Result<(), LockboxError>;

    async fn delete(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), LockboxError>;
}
