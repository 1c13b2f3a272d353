// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram transport for Lockbox.
//!
//! Implements [`MessageTransport`] over the Bot API via teloxide, decodes
//! webhook updates into [`lockbox_core::InboundMessage`] values and performs
//! the webhook registration handshake at startup.

pub mod update;
pub mod webhook;

use async_trait::async_trait;
use lockbox_core::{
    AdapterType, ChatId, HealthStatus, Keyboard, LockboxError, MessageId, MessageTransport,
    ParseMode, PluginAdapter, SendOptions, SentMessage,
};
use teloxide::prelude::*;
use teloxide::types::{
    ChatId as TgChatId, KeyboardButton, KeyboardMarkup, MessageId as TgMessageId,
    ParseMode as TgParseMode, ReplyParameters,
};
use teloxide::{ApiError, RequestError};
use tracing::debug;

pub use update::{decode_payload, decode_update};

/// Telegram implementation of [`MessageTransport`].
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Creates a transport for the given bot token.
    pub fn new(token: Option<&str>) -> Result<Self, LockboxError> {
        let token = token.ok_or_else(|| {
            LockboxError::Config("secrets.bot_token is required (LOCKBOX_SECRETS_BOT_TOKEN)".into())
        })?;

        if token.is_empty() {
            return Err(LockboxError::Config(
                "secrets.bot_token cannot be empty".into(),
            ));
        }

        Ok(Self {
            bot: Bot::new(token),
        })
    }

    /// Points the client at another Bot API server.
    pub fn with_api_url(mut self, url: reqwest::Url) -> Self {
        self.bot = self.bot.set_api_url(url);
        self
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

fn tg_parse_mode(mode: ParseMode) -> TgParseMode {
    match mode {
        ParseMode::MarkdownV2 => TgParseMode::MarkdownV2,
        ParseMode::Html => TgParseMode::Html,
    }
}

fn tg_keyboard(keyboard: &Keyboard) -> KeyboardMarkup {
    KeyboardMarkup::new(
        keyboard
            .rows
            .iter()
            .map(|row| row.iter().map(KeyboardButton::new).collect::<Vec<_>>()),
    )
    .resize_keyboard()
}

fn transport_error(action: &str, e: RequestError) -> LockboxError {
    LockboxError::transport(format!("failed to {action}: {e}"), Some(Box::new(e)))
}

fn is_not_modified(e: &RequestError) -> bool {
    matches!(e, RequestError::Api(ApiError::MessageNotModified))
        || e.to_string().contains("message is not modified")
}

#[async_trait]
impl PluginAdapter for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, LockboxError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), LockboxError> {
        debug!("Telegram transport shutting down");
        Ok(())
    }
}

#[async_trait]
impl MessageTransport for TelegramTransport {
    async fn send(
        &self,
        chat_id: ChatId,
        text: &str,
        options: SendOptions,
    ) -> Result<SentMessage, LockboxError> {
        let mut request = self.bot.send_message(TgChatId(chat_id.0), text);
        if let Some(mode) = options.parse_mode {
            request = request.parse_mode(tg_parse_mode(mode));
        }
        if let Some(keyboard) = &options.reply_markup {
            request = request.reply_markup(tg_keyboard(keyboard));
        }
        if let Some(reply_to) = options.reply_to {
            request = request.reply_parameters(ReplyParameters::new(TgMessageId(reply_to.0)));
        }

        let sent = request
            .await
            .map_err(|e| transport_error("send message", e))?;

        Ok(SentMessage {
            chat_id: ChatId(sent.chat.id.0),
            message_id: MessageId(sent.id.0),
        })
    }

    async fn edit(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        options: SendOptions,
    ) -> Result<(), LockboxError> {
        let mut request =
            self.bot
                .edit_message_text(TgChatId(chat_id.0), TgMessageId(message_id.0), text);
        if let Some(mode) = options.parse_mode {
            request = request.parse_mode(tg_parse_mode(mode));
        }

        match request.await {
            Ok(_) => Ok(()),
            Err(e) if is_not_modified(&e) => {
                debug!(chat_id = %chat_id, message_id = %message_id, "edit was a no-op");
                Ok(())
            }
            Err(e) => Err(transport_error("edit message", e)),
        }
    }

    async fn delete(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), LockboxError> {
        self.bot
            .delete_message(TgChatId(chat_id.0), TgMessageId(message_id.0))
            .await
            .map_err(|e| transport_error("delete message", e))?;
        Ok(())
    }
}
