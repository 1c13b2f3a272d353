// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use lockbox_config::model::StorageConfig;
use lockbox_core::{
    AdapterType, CredentialRecord, HealthStatus, LockboxError, PluginAdapter, StateRecord,
    StorageAdapter, UserId, UserRecord,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened by [`StorageAdapter::initialize`]; every other
/// operation fails until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, LockboxError> {
        self.db.get().ok_or_else(|| LockboxError::Storage {
            source: "storage not initialized, call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, LockboxError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        let probe = db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch("SELECT 1;") })
            .await
            .map_err(map_tr_err);
        Ok(match probe {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), LockboxError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), LockboxError> {
        let db = Database::open(
            &self.config.database_path,
            Duration::from_secs(self.config.busy_timeout_secs),
            self.config.wal_mode,
        )
        .await?;
        self.db.set(db).map_err(|_| LockboxError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), LockboxError> {
        self.db()?.checkpoint().await
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<UserRecord>, LockboxError> {
        queries::users::get_user(self.db()?, user_id).await
    }

    async fn upsert_user(
        &self,
        user_id: UserId,
        encrypted_token: &[u8],
    ) -> Result<(), LockboxError> {
        queries::users::upsert_user(self.db()?, user_id, encrypted_token.to_vec()).await
    }

    async fn upsert_service(&self, user_id: UserId, service: &str) -> Result<(), LockboxError> {
        queries::credentials::upsert_service(self.db()?, user_id, service).await
    }

    async fn set_username(
        &self,
        user_id: UserId,
        service: &str,
        username: &str,
    ) -> Result<(), LockboxError> {
        queries::credentials::set_username(self.db()?, user_id, service, username).await
    }

    async fn set_password(
        &self,
        user_id: UserId,
        service: &str,
        encrypted_password: &[u8],
    ) -> Result<(), LockboxError> {
        queries::credentials::set_password(self.db()?, user_id, service, encrypted_password.to_vec())
            .await
    }

    async fn get_credential(
        &self,
        user_id: UserId,
        service: &str,
    ) -> Result<Option<CredentialRecord>, LockboxError> {
        queries::credentials::get_credential(self.db()?, user_id, service).await
    }

    async fn list_services(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<String>, LockboxError> {
        queries::credentials::list_services(self.db()?, user_id, limit).await
    }

    async fn delete_credential(&self, user_id: UserId, service: &str) -> Result<(), LockboxError> {
        queries::credentials::delete_credential(self.db()?, user_id, service).await
    }

    async fn delete_credentials_for_user(&self, user_id: UserId) -> Result<u64, LockboxError> {
        queries::credentials::delete_credentials_for_user(self.db()?, user_id).await
    }

    async fn get_state(&self, user_id: UserId) -> Result<Option<StateRecord>, LockboxError> {
        queries::state::get_state(self.db()?, user_id).await
    }

    async fn set_state(&self, user_id: UserId, state: &str) -> Result<(), LockboxError> {
        queries::state::set_state(self.db()?, user_id, state).await
    }

    async fn set_last_service(&self, user_id: UserId, service: &str) -> Result<(), LockboxError> {
        queries::state::set_last_service(self.db()?, user_id, service).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    const USER: UserId = UserId(1001);

    async fn open() -> (SqliteStorage, TempDir) {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("test.db").display().to_string(),
            busy_timeout_secs: 1,
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        (storage, dir)
    }

    #[tokio::test]
    async fn identifies_as_sqlite_storage() {
        let (storage, _dir) = open().await;
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn uninitialized_storage_is_unhealthy_and_rejects_queries() {
        let storage = SqliteStorage::new(StorageConfig {
            database_path: "/nonexistent/never-opened.db".into(),
            busy_timeout_secs: 1,
            wal_mode: true,
        });
        assert!(matches!(
            storage.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
        assert!(storage.get_state(USER).await.is_err());
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let (storage, _dir) = open().await;
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn user_token_upsert_overwrites() {
        let (storage, _dir) = open().await;
        assert!(storage.get_user(USER).await.unwrap().is_none());

        storage.upsert_user(USER, b"first").await.unwrap();
        storage.upsert_user(USER, b"second").await.unwrap();

        let user = storage.get_user(USER).await.unwrap().unwrap();
        assert_eq!(user.encrypted_token, b"second");
    }

    #[tokio::test]
    async fn credential_is_built_incrementally() {
        let (storage, _dir) = open().await;
        storage.upsert_service(USER, "github").await.unwrap();

        let shell = storage.get_credential(USER, "github").await.unwrap().unwrap();
        assert_eq!(shell.username, None);
        assert_eq!(shell.encrypted_password, None);

        storage.set_username(USER, "github", "alice").await.unwrap();
        storage.set_password(USER, "github", b"sealed").await.unwrap();
        storage.upsert_service(USER, "github").await.unwrap();

        let full = storage.get_credential(USER, "github").await.unwrap().unwrap();
        assert_eq!(full.service_name, "github");
        assert_eq!(full.username.as_deref(), Some("alice"));
        assert_eq!(full.encrypted_password.as_deref(), Some(&b"sealed"[..]));
    }

    #[tokio::test]
    async fn listing_respects_limit_and_owner() {
        let (storage, _dir) = open().await;
        for i in 0..60 {
            storage.upsert_service(USER, &format!("svc-{i:02}")).await.unwrap();
        }
        storage.upsert_service(UserId(2), "other").await.unwrap();

        let names = storage.list_services(USER, 50).await.unwrap();
        assert_eq!(names.len(), 50);
        assert_eq!(names[0], "svc-00");
        assert!(!names.contains(&"other".to_string()));
    }

    #[tokio::test]
    async fn deletes_are_scoped() {
        let (storage, _dir) = open().await;
        for name in ["a", "b", "c"] {
            storage.upsert_service(USER, name).await.unwrap();
        }
        storage.upsert_service(UserId(2), "a").await.unwrap();

        storage.delete_credential(USER, "a").await.unwrap();
        storage.delete_credential(USER, "missing").await.unwrap();
        assert_eq!(storage.list_services(USER, 50).await.unwrap(), ["b", "c"]);

        assert_eq!(storage.delete_credentials_for_user(USER).await.unwrap(), 2);
        assert!(storage.list_services(USER, 50).await.unwrap().is_empty());
        assert_eq!(storage.list_services(UserId(2), 50).await.unwrap(), ["a"]);
    }

    #[tokio::test]
    async fn state_setters_touch_only_their_column() {
        let (storage, _dir) = open().await;
        assert!(storage.get_state(USER).await.unwrap().is_none());

        storage.set_last_service(USER, "github").await.unwrap();
        let row = storage.get_state(USER).await.unwrap().unwrap();
        assert_eq!(row.state, "default");
        assert_eq!(row.last_service, "github");

        storage.set_state(USER, "setUsername").await.unwrap();
        let row = storage.get_state(USER).await.unwrap().unwrap();
        assert_eq!(row.state, "setUsername");
        assert_eq!(row.last_service, "github");
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("persist.db").display().to_string(),
            busy_timeout_secs: 1,
            wal_mode: true,
        };

        let storage = SqliteStorage::new(config.clone());
        storage.initialize().await.unwrap();
        storage.set_state(USER, "checkToken").await.unwrap();
        storage.shutdown().await.unwrap();
        drop(storage);

        let reopened = SqliteStorage::new(config);
        reopened.initialize().await.unwrap();
        let row = reopened.get_state(USER).await.unwrap().unwrap();
        assert_eq!(row.state, "checkToken");
    }
}
