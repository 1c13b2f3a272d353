// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of being silently ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level Lockbox configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LockboxConfig {
    /// Logging verbosity.
    #[serde(default)]
    pub logger: LoggerConfig,

    /// Chat bot behavior and webhook registration.
    #[serde(default)]
    pub bot: BotConfig,

    /// Inbound webhook HTTP server.
    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite persistence.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Environment-provisioned secrets.
    #[serde(default)]
    pub secrets: SecretsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggerConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Forces `debug` regardless of `level`.
    #[serde(default)]
    pub debug: bool,
}

impl LoggerConfig {
    /// The level the subscriber should be initialised with.
    pub fn effective_level(&self) -> &str {
        if self.debug { "debug" } else { &self.level }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            debug: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Seconds a revealed credential stays visible before deletion.
    #[serde(default = "default_auto_delete_secs")]
    pub auto_delete_secs: u64,

    #[serde(default)]
    pub webhook: WebhookConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            auto_delete_secs: default_auto_delete_secs(),
            webhook: WebhookConfig::default(),
        }
    }
}

fn default_auto_delete_secs() -> u64 {
    20
}

/// Parameters of the `setWebhook` registration handshake.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    /// Public HTTPS URL the chat platform delivers updates to.
    #[serde(default = "default_webhook_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u8,

    /// Attempts made while the platform reports no URL or a delivery error.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    #[serde(default = "default_retry_sleep_secs")]
    pub retry_sleep_secs: u64,

    #[serde(default = "default_true")]
    pub drop_pending_updates: bool,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: default_webhook_url(),
            max_connections: default_max_connections(),
            retry_count: default_retry_count(),
            retry_sleep_secs: default_retry_sleep_secs(),
            drop_pending_updates: default_true(),
        }
    }
}

fn default_webhook_url() -> String {
    "https://example.com:8443".to_string()
}

fn default_max_connections() -> u8 {
    40
}

fn default_retry_count() -> u32 {
    5
}

fn default_retry_sleep_secs() -> u64 {
    2
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8443
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// How long a statement waits on a locked database.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            busy_timeout_secs: default_busy_timeout_secs(),
            wal_mode: default_true(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_local_dir()
        .map(|d| d.join("lockbox").join("lockbox.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("lockbox.db"))
        .display()
        .to_string()
}

fn default_busy_timeout_secs() -> u64 {
    2
}

/// Secrets, normally supplied through `LOCKBOX_SECRETS_*`.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecretsConfig {
    /// Chat platform bot token.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Shared secret expected in `X-Telegram-Bot-Api-Secret-Token`.
    #[serde(default)]
    pub webhook_secret_token: Option<String>,

    /// Raw 32-byte AES-256 key, used verbatim.
    #[serde(default)]
    pub encryption_key: Option<String>,
}

impl fmt::Debug for SecretsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &Option<String>) -> &'static str {
            if value.is_some() { "[REDACTED]" } else { "None" }
        }
        f.debug_struct("SecretsConfig")
            .field("bot_token", &redact(&self.bot_token))
            .field("webhook_secret_token", &redact(&self.webhook_secret_token))
            .field("encryption_key", &redact(&self.encryption_key))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let secrets = SecretsConfig {
            bot_token: Some("123:very-secret".into()),
            webhook_secret_token: None,
            encryption_key: Some("k".repeat(32)),
        };
        let rendered = format!("{secrets:?}");
        assert!(!rendered.contains("very-secret"));
        assert!(!rendered.contains("kkkk"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(rendered.contains("webhook_secret_token: \"None\""));
    }

    #[test]
    fn debug_flag_overrides_level() {
        let logger = LoggerConfig {
            level: "warn".into(),
            debug: true,
        };
        assert_eq!(logger.effective_level(), "debug");
        assert_eq!(LoggerConfig::default().effective_level(), "info");
    }
}
