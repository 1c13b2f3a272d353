// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook registration handshake.
//!
//! `setWebhook` is sent, then `getWebhookInfo` is polled to confirm that
//! Telegram accepted the URL and has no delivery error on record. Failed
//! attempts are retried after a fixed pause.

use std::time::Duration;

use lockbox_config::model::WebhookConfig;
use lockbox_core::LockboxError;
use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::TelegramTransport;

/// Outcome of one registration attempt.
enum Attempt {
    Registered,
    Failed(String),
}

impl TelegramTransport {
    /// Register the webhook, retrying `retry_count` times.
    ///
    /// Returns early with `Ok` if `cancel` fires between attempts.
    pub async fn register_webhook(
        &self,
        config: &WebhookConfig,
        secret_token: &str,
        cancel: &CancellationToken,
    ) -> Result<(), LockboxError> {
        let url = reqwest::Url::parse(&config.url)
            .map_err(|e| LockboxError::Config(format!("invalid bot.webhook.url: {e}")))?;
        let pause = Duration::from_secs(config.retry_sleep_secs);
        let attempts = config.retry_count.saturating_add(1);

        for attempt in 1..=attempts {
            match self.try_register(&url, config, secret_token).await {
                Attempt::Registered => {
                    info!(url = %url, attempt, "Telegram webhook registered");
                    return Ok(());
                }
                Attempt::Failed(reason) if attempt < attempts => {
                    warn!(attempt, reason = %reason, "Telegram webhook not confirmed, retrying");
                }
                Attempt::Failed(reason) => {
                    return Err(LockboxError::transport(
                        format!("Telegram webhook registration failed after {attempts} attempts: {reason}"),
                        None,
                    ));
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = cancel.cancelled() => return Ok(()),
            }
        }

        Ok(())
    }

    async fn try_register(
        &self,
        url: &reqwest::Url,
        config: &WebhookConfig,
        secret_token: &str,
    ) -> Attempt {
        if let Err(e) = self
            .bot()
            .set_webhook(url.clone())
            .max_connections(config.max_connections)
            .secret_token(secret_token.to_string())
            .drop_pending_updates(config.drop_pending_updates)
            .await
        {
            return Attempt::Failed(format!("setWebhook: {e}"));
        }

        match self.bot().get_webhook_info().await {
            Err(e) => Attempt::Failed(format!("getWebhookInfo: {e}")),
            Ok(info) if info.url.is_none() => Attempt::Failed("webhook URL is not set".into()),
            Ok(info) if info.last_error_date.is_some() => Attempt::Failed(
                info.last_error_message
                    .unwrap_or_else(|| "unknown delivery error".into()),
            ),
            Ok(_) => Attempt::Registered,
        }
    }
}
