// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encryption at rest for Lockbox.
//!
//! [`crypto`] seals short secrets with AES-256-GCM under a caller-supplied
//! key. [`CredentialVault`] stores master tokens and per-service credentials
//! through any [`lockbox_core::StorageAdapter`], encrypting on the way in and
//! decrypting on the way out.

pub mod credentials;
pub mod crypto;

pub use credentials::{Credential, CredentialVault, Lookup, MAX_SERVICES, TokenVerdict};
pub use crypto::{EncryptionKey, decrypt, encrypt};
