// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::LockboxConfig;

/// Required length of the raw AES-256 key.
pub const ENCRYPTION_KEY_LEN: usize = 32;

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &LockboxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.server.host.trim().is_empty() {
        fail("server.host must not be empty".to_string());
    }

    if config.server.port == 0 {
        fail("server.port must be non-zero".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let webhook = &config.bot.webhook;
    if !webhook.url.starts_with("https://") {
        fail(format!(
            "bot.webhook.url must be an https:// URL, got `{}`",
            webhook.url
        ));
    }

    if !(1..=100).contains(&webhook.max_connections) {
        fail(format!(
            "bot.webhook.max_connections must be between 1 and 100, got {}",
            webhook.max_connections
        ));
    }

    if let Some(key) = &config.secrets.encryption_key
        && key.len() != ENCRYPTION_KEY_LEN
    {
        fail(format!(
            "secrets.encryption_key must be exactly {ENCRYPTION_KEY_LEN} bytes, got {}",
            key.len()
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &LockboxConfig) -> Vec<String> {
        validate_config(config)
            .err()
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&LockboxConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = LockboxConfig::default();
        config.server.host = " ".into();
        config.server.port = 0;
        config.bot.webhook.url = "http://insecure.example".into();
        config.bot.webhook.max_connections = 0;

        let errors = messages(&config);
        assert_eq!(errors.len(), 4, "got {errors:?}");
        assert!(errors.iter().any(|e| e.contains("server.host")));
        assert!(errors.iter().any(|e| e.contains("https://")));
    }

    #[test]
    fn short_encryption_key_is_rejected() {
        let mut config = LockboxConfig::default();
        config.secrets.encryption_key = Some("too-short".into());
        let errors = messages(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("exactly 32 bytes, got 9"));
    }

    #[test]
    fn exact_length_key_is_accepted() {
        let mut config = LockboxConfig::default();
        config.secrets.encryption_key = Some("0123456789abcdef0123456789abcdef".into());
        assert!(validate_config(&config).is_ok());
    }
}
