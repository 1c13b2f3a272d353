// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lockbox serve` command implementation.
//!
//! Wires SQLite storage, the Telegram transport, the reveal scheduler and
//! the dispatcher behind the webhook gateway, registers the webhook in the
//! background, and runs until SIGINT/SIGTERM.

use std::sync::Arc;

use lockbox_agent::{Dispatcher, RevealScheduler, shutdown};
use lockbox_config::LockboxConfig;
use lockbox_config::model::SecretsConfig;
use lockbox_core::{LockboxError, StorageAdapter};
use lockbox_gateway::{AuthConfig, GatewayState};
use lockbox_storage::SqliteStorage;
use lockbox_telegram::TelegramTransport;
use lockbox_vault::EncryptionKey;
use tracing::{error, info, warn};

/// Runs the `lockbox serve` command.
pub async fn run_serve(config: LockboxConfig) -> Result<(), LockboxError> {
    init_tracing(config.logger.effective_level());

    info!(version = env!("CARGO_PKG_VERSION"), "starting lockbox serve");

    let key = load_encryption_key(&config.secrets)?;
    let secret_token = config
        .secrets
        .webhook_secret_token
        .clone()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            LockboxError::Config(
                "secrets.webhook_secret_token is required (LOCKBOX_SECRETS_WEBHOOK_SECRET_TOKEN)"
                    .into(),
            )
        })?;

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let transport = Arc::new(TelegramTransport::new(config.secrets.bot_token.as_deref())?);
    let reveals = RevealScheduler::new(transport.clone(), config.bot.auto_delete_secs);
    let dispatcher = Arc::new(Dispatcher::new(
        storage.clone(),
        transport.clone(),
        reveals.clone(),
        key,
    ));

    let cancel = shutdown::install_signal_handler();

    // Registration failure is fatal: without a webhook no update arrives.
    {
        let transport = transport.clone();
        let webhook = config.bot.webhook.clone();
        let secret = secret_token.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = transport.register_webhook(&webhook, &secret, &cancel).await {
                error!(error = %e, "webhook registration failed, shutting down");
                cancel.cancel();
            }
        });
    }

    let state = GatewayState {
        dispatcher,
        transport,
        storage: storage.clone(),
    };
    let auth = AuthConfig {
        secret_token: Some(secret_token),
    };

    let served = lockbox_gateway::start_server(&config.server, state, auth, cancel.clone()).await;
    cancel.cancel();

    reveals.shutdown().await;
    if let Err(e) = storage.close().await {
        warn!(error = %e, "failed to close storage cleanly");
    }

    served?;
    info!("lockbox serve shutdown complete");
    Ok(())
}

/// Parses the configured AES-256 key.
///
/// A missing key or one of the wrong length stops startup.
pub fn load_encryption_key(secrets: &SecretsConfig) -> Result<EncryptionKey, LockboxError> {
    let raw = secrets.encryption_key.as_deref().ok_or_else(|| {
        LockboxError::Config(
            "secrets.encryption_key is required (LOCKBOX_SECRETS_ENCRYPTION_KEY)".into(),
        )
    })?;
    Ok(EncryptionKey::from_bytes(raw.as_bytes())?)
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "lockbox={log_level},lockbox_agent={log_level},lockbox_gateway={log_level},\
             lockbox_telegram={log_level},lockbox_vault={log_level},lockbox_storage={log_level},\
             tower_http={log_level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_core::CryptoError;

    fn secrets(key: Option<&str>) -> SecretsConfig {
        SecretsConfig {
            encryption_key: key.map(str::to_string),
            ..SecretsConfig::default()
        }
    }

    #[test]
    fn valid_key_is_accepted() {
        assert!(load_encryption_key(&secrets(Some("0123456789abcdef0123456789abcdef"))).is_ok());
    }

    #[test]
    fn wrong_key_length_stops_startup() {
        let err = load_encryption_key(&secrets(Some("too short"))).unwrap_err();
        assert!(matches!(
            err,
            LockboxError::Crypto(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 9
            })
        ));
    }

    #[test]
    fn missing_key_is_a_config_error() {
        assert!(matches!(
            load_encryption_key(&secrets(None)),
            Err(LockboxError::Config(_))
        ));
    }
}
