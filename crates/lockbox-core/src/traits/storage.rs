// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the persistence backend.

use async_trait::async_trait;

use crate::error::LockboxError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CredentialRecord, StateRecord, UserId, UserRecord};

/// Persistence over the three logical collections `users`, `credentials`
/// and `state`.
///
/// Every method is a single atomic operation. Callers that chain several
/// of them get no transactional guarantee across the chain. Encryption is
/// not this layer's concern: blobs arrive already sealed.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Prepares the backend (schema migrations and the like).
    async fn initialize(&self) -> Result<(), LockboxError>;

    /// Closes the backend, flushing pending writes and releasing connections.
    async fn close(&self) -> Result<(), LockboxError>;

    // --- users ---

    async fn get_user(&self, user_id: UserId) -> Result<Option<UserRecord>, LockboxError>;

    /// Inserts or overwrites the user's encrypted master token.
    async fn upsert_user(&self, user_id: UserId, encrypted_token: &[u8])
    -> Result<(), LockboxError>;

    // --- credentials ---

    /// Creates an empty credential shell. An existing row is left intact.
    async fn upsert_service(&self, user_id: UserId, service: &str) -> Result<(), LockboxError>;

    async fn set_username(
        &self,
        user_id: UserId,
        service: &str,
        username: &str,
    ) -> Result<(), LockboxError>;

    async fn set_password(
        &self,
        user_id: UserId,
        service: &str,
        encrypted_password: &[u8],
    ) -> Result<(), LockboxError>;

    async fn get_credential(
        &self,
        user_id: UserId,
        service: &str,
    ) -> Result<Option<CredentialRecord>, LockboxError>;

    /// Returns at most `limit` service names owned by the user.
    async fn list_services(&self, user_id: UserId, limit: usize)
    -> Result<Vec<String>, LockboxError>;

    /// Removes one credential. Absent rows are not an error.
    async fn delete_credential(&self, user_id: UserId, service: &str) -> Result<(), LockboxError>;

    /// Removes every credential owned by the user, returning how many were removed.
    async fn delete_credentials_for_user(&self, user_id: UserId) -> Result<u64, LockboxError>;

    // --- state ---

    async fn get_state(&self, user_id: UserId) -> Result<Option<StateRecord>, LockboxError>;

    async fn set_state(&self, user_id: UserId, state: &str) -> Result<(), LockboxError>;

    async fn set_last_service(&self, user_id: UserId, service: &str) -> Result<(), LockboxError>;
}
