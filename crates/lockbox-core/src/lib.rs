// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Lockbox credential bot.
//!
//! This crate provides the error taxonomy, the identifiers and records shared
//! by every other crate, and the adapter traits that decouple the
//! conversation logic from persistence and from the chat transport.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{CryptoError, LockboxError};
pub use types::{
    AdapterType, ChatId, CredentialRecord, HealthStatus, InboundMessage, Keyboard, MessageId,
    ParseMode, SendOptions, SentMessage, StateRecord, UserId, UserRecord,
};

pub use traits::{MessageTransport, PluginAdapter, StorageAdapter};
