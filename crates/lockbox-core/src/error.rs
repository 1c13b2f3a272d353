// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Lockbox credential bot.

use thiserror::Error;

/// The primary error type used across all Lockbox adapter traits and core operations.
#[derive(Debug, Error)]
pub enum LockboxError {
    /// Configuration errors (invalid TOML, missing secrets, bad key material).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Outbound or inbound chat transport errors (send, edit, delete, webhook).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Encryption or decryption failures.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LockboxError {
    /// Wraps any storage-layer error.
    pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage {
            source: Box::new(source),
        }
    }

    /// Builds a transport error with an optional underlying cause.
    pub fn transport(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source,
        }
    }
}

/// Failures of the authenticated cipher.
///
/// `AuthenticationFailed` is expected during normal operation (wrong or
/// rotated key, tampered or truncated blob). `InvalidKeyLength` is a
/// misconfiguration and must stop the process at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid encryption key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("decryption failed: authentication tag mismatch")]
    AuthenticationFailed,
}
