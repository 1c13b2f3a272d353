// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage backend.
//!
//! Behaves like the SQLite backend: one atomic operation per call, service
//! shells created with no username or password, and listings ordered by
//! service name.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use lockbox_core::{
    AdapterType, CredentialRecord, HealthStatus, LockboxError, PluginAdapter, StateRecord,
    StorageAdapter, UserId, UserRecord,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, Vec<u8>>,
    credentials: BTreeMap<(i64, String), (Option<String>, Option<Vec<u8>>)>,
    state: BTreeMap<i64, (String, String)>,
}

/// A `StorageAdapter` backed by ordered maps behind a mutex.
#[derive(Default)]
pub struct MemoryStorage {
    tables: Mutex<Tables>,
    failing: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails with a storage error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Raw state row, bypassing any defaulting.
    pub async fn raw_state(&self, user_id: UserId) -> Option<(String, String)> {
        self.tables.lock().await.state.get(&user_id.0).cloned()
    }

    /// Number of credential rows across all users.
    pub async fn credential_count(&self) -> usize {
        self.tables.lock().await.credentials.len()
    }

    fn check(&self) -> Result<(), LockboxError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(LockboxError::storage(std::io::Error::other(
                "memory storage is in failing mode",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, LockboxError> {
        if self.failing.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Unhealthy("failing mode".into()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LockboxError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn initialize(&self) -> Result<(), LockboxError> {
        self.check()
    }

    async fn close(&self) -> Result<(), LockboxError> {
        Ok(())
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<UserRecord>, LockboxError> {
        self.check()?;
        let tables = self.tables.lock().await;
        Ok(tables.users.get(&user_id.0).map(|token| UserRecord {
            user_id,
            encrypted_token: token.clone(),
        }))
    }

    async fn upsert_user(
        &self,
        user_id: UserId,
        encrypted_token: &[u8],
    ) -> Result<(), LockboxError> {
        self.check()?;
        self.tables
            .lock()
            .await
            .users
            .insert(user_id.0, encrypted_token.to_vec());
        Ok(())
    }

    async fn upsert_service(&self, user_id: UserId, service: &str) -> Result<(), LockboxError> {
        self.check()?;
        self.tables
            .lock()
            .await
            .credentials
            .entry((user_id.0, service.to_string()))
            .or_default();
        Ok(())
    }

    async fn set_username(
        &self,
        user_id: UserId,
        service: &str,
        username: &str,
    ) -> Result<(), LockboxError> {
        self.check()?;
        let mut tables = self.tables.lock().await;
        let entry = tables
            .credentials
            .entry((user_id.0, service.to_string()))
            .or_default();
        entry.0 = Some(username.to_string());
        Ok(())
    }

    async fn set_password(
        &self,
        user_id: UserId,
        service: &str,
        encrypted_password: &[u8],
    ) -> Result<(), LockboxError> {
        self.check()?;
        let mut tables = self.tables.lock().await;
        let entry = tables
            .credentials
            .entry((user_id.0, service.to_string()))
            .or_default();
        entry.1 = Some(encrypted_password.to_vec());
        Ok(())
    }

    async fn get_credential(
        &self,
        user_id: UserId,
        service: &str,
    ) -> Result<Option<CredentialRecord>, LockboxError> {
        self.check()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .credentials
            .get(&(user_id.0, service.to_string()))
            .map(|(username, password)| CredentialRecord {
                user_id,
                service_name: service.to_string(),
                username: username.clone(),
                encrypted_password: password.clone(),
            }))
    }

    async fn list_services(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<String>, LockboxError> {
        self.check()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .credentials
            .keys()
            .filter(|(owner, _)| *owner == user_id.0)
            .map(|(_, service)| service.clone())
            .take(limit)
            .collect())
    }

    async fn delete_credential(&self, user_id: UserId, service: &str) -> Result<(), LockboxError> {
        self.check()?;
        self.tables
            .lock()
            .await
            .credentials
            .remove(&(user_id.0, service.to_string()));
        Ok(())
    }

    async fn delete_credentials_for_user(&self, user_id: UserId) -> Result<u64, LockboxError> {
        self.check()?;
        let mut tables = self.tables.lock().await;
        let before = tables.credentials.len();
        tables.credentials.retain(|(owner, _), _| *owner != user_id.0);
        Ok((before - tables.credentials.len()) as u64)
    }

    async fn get_state(&self, user_id: UserId) -> Result<Option<StateRecord>, LockboxError> {
        self.check()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .state
            .get(&user_id.0)
            .map(|(state, last_service)| StateRecord {
                user_id,
                state: state.clone(),
                last_service: last_service.clone(),
            }))
    }

    async fn set_state(&self, user_id: UserId, state: &str) -> Result<(), LockboxError> {
        self.check()?;
        let mut tables = self.tables.lock().await;
        let row = tables
            .state
            .entry(user_id.0)
            .or_insert_with(|| ("default".to_string(), String::new()));
        row.0 = state.to_string();
        Ok(())
    }

    async fn set_last_service(&self, user_id: UserId, service: &str) -> Result<(), LockboxError> {
        self.check()?;
        let mut tables = self.tables.lock().await;
        let row = tables
            .state
            .entry(user_id.0)
            .or_insert_with(|| ("default".to_string(), String::new()));
        row.1 = service.to_string();
        Ok(())
    }
}
