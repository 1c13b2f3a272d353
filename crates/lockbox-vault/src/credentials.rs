// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user master tokens and per-service credentials.
//!
//! The vault owns the encryption boundary: callers hand it plaintext and
//! receive plaintext, storage only ever sees sealed blobs. The key is passed
//! per call so the vault holds no key material of its own.

use std::sync::Arc;

use lockbox_core::{CryptoError, LockboxError, StorageAdapter, UserId};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::crypto::{self, EncryptionKey};

/// Upper bound on service names returned by [`CredentialVault::list_service_names`].
pub const MAX_SERVICES: usize = 50;

/// A fully entered, decrypted credential.
#[derive(Debug)]
pub struct Credential {
    pub service: String,
    pub username: String,
    pub password: SecretString,
}

/// Result of looking a credential up by service name.
#[derive(Debug)]
pub enum Lookup {
    Found(Credential),
    /// The service exists but its username or password was never entered.
    Incomplete,
    NotFound,
}

/// Outcome of comparing a candidate against the stored master token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenVerdict {
    Match,
    /// Wrong guess, or the user has no token stored.
    Mismatch,
    /// The stored token no longer authenticates under the current key:
    /// the key was rotated or the row is corrupt.
    Unreadable,
}

/// Encrypted credential store on top of a [`StorageAdapter`].
#[derive(Clone)]
pub struct CredentialVault {
    storage: Arc<dyn StorageAdapter>,
}

impl std::fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVault")
            .field("storage", &self.storage.name())
            .finish()
    }
}

impl CredentialVault {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Whether a master token has ever been stored for `user_id`.
    ///
    /// Nothing is decrypted.
    pub async fn user_exists(&self, user_id: UserId) -> Result<bool, LockboxError> {
        Ok(self.storage.get_user(user_id).await?.is_some())
    }

    pub async fn create_or_set_master_token(
        &self,
        user_id: UserId,
        token: &str,
        key: &EncryptionKey,
    ) -> Result<(), LockboxError> {
        let sealed = crypto::encrypt(token.as_bytes(), key)?;
        self.storage.upsert_user(user_id, &sealed).await?;
        info!(user_id = %user_id, "master token stored");
        Ok(())
    }

    pub async fn verify_master_token(
        &self,
        user_id: UserId,
        candidate: &str,
        key: &EncryptionKey,
    ) -> Result<TokenVerdict, LockboxError> {
        let Some(user) = self.storage.get_user(user_id).await? else {
            debug!(user_id = %user_id, "no master token stored");
            return Ok(TokenVerdict::Mismatch);
        };

        match crypto::decrypt(&user.encrypted_token, key) {
            Ok(stored) if constant_time_eq(&stored, candidate.as_bytes()) => Ok(TokenVerdict::Match),
            Ok(_) => Ok(TokenVerdict::Mismatch),
            Err(CryptoError::AuthenticationFailed) => {
                warn!(user_id = %user_id, "stored master token failed authentication");
                Ok(TokenVerdict::Unreadable)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the master token, then purge every credential of the user.
    ///
    /// Returns the number of credentials removed.
    pub async fn update_master_token(
        &self,
        user_id: UserId,
        new_token: &str,
        key: &EncryptionKey,
    ) -> Result<u64, LockboxError> {
        let sealed = crypto::encrypt(new_token.as_bytes(), key)?;
        self.storage.upsert_user(user_id, &sealed).await?;
        let purged = self.storage.delete_credentials_for_user(user_id).await?;
        info!(user_id = %user_id, purged, "master token replaced, credentials purged");
        Ok(purged)
    }

    /// Create the credential shell for `service`. An existing entry is kept.
    pub async fn set_service(&self, user_id: UserId, service: &str) -> Result<(), LockboxError> {
        self.storage.upsert_service(user_id, service).await
    }

    pub async fn set_username(
        &self,
        user_id: UserId,
        service: &str,
        username: &str,
    ) -> Result<(), LockboxError> {
        self.storage.set_username(user_id, service, username).await
    }

    pub async fn set_password(
        &self,
        user_id: UserId,
        service: &str,
        password: &str,
        key: &EncryptionKey,
    ) -> Result<(), LockboxError> {
        let sealed = crypto::encrypt(password.as_bytes(), key)?;
        self.storage.set_password(user_id, service, &sealed).await
    }

    /// Fetch and decrypt the credential for `service`.
    ///
    /// A password that fails authentication is an error, never a miss.
    pub async fn get(
        &self,
        user_id: UserId,
        service: &str,
        key: &EncryptionKey,
    ) -> Result<Lookup, LockboxError> {
        let Some(record) = self.storage.get_credential(user_id, service).await? else {
            return Ok(Lookup::NotFound);
        };

        let (Some(username), Some(sealed)) = (record.username, record.encrypted_password) else {
            return Ok(Lookup::Incomplete);
        };

        let plaintext = crypto::decrypt(&sealed, key)?;
        let password = String::from_utf8(plaintext.to_vec())
            .map_err(|e| LockboxError::Internal(format!("stored password is not UTF-8: {e}")))?;

        Ok(Lookup::Found(Credential {
            service: record.service_name,
            username,
            password: SecretString::from(password),
        }))
    }

    /// Service names owned by the user, at most [`MAX_SERVICES`].
    pub async fn list_service_names(&self, user_id: UserId) -> Result<Vec<String>, LockboxError> {
        self.storage.list_services(user_id, MAX_SERVICES).await
    }

    /// Remove one credential. Absent entries are not an error.
    pub async fn delete(&self, user_id: UserId, service: &str) -> Result<(), LockboxError> {
        self.storage.delete_credential(user_id, service).await
    }
}

/// Byte equality without an early exit on the first difference.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
