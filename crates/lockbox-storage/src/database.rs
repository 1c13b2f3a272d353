// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection management: PRAGMA setup, migrations, and WAL checkpointing.
//!
//! All statements run on tokio-rusqlite's single background thread. Do not
//! open additional connections for writes.

use std::path::Path;
use std::time::Duration;

use lockbox_core::LockboxError;
use tracing::debug;

use crate::migrations;

/// An open, migrated database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` and migrate it.
    pub async fn open(
        path: &str,
        busy_timeout: Duration,
        wal_mode: bool,
    ) -> Result<Self, LockboxError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(LockboxError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(LockboxError::storage)?;
        let db = Self { conn };
        db.prepare(busy_timeout, wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// A migrated in-memory database.
    pub async fn open_in_memory() -> Result<Self, LockboxError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(LockboxError::storage)?;
        let db = Self { conn };
        db.prepare(Duration::from_secs(2), false).await?;
        Ok(db)
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flush the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), LockboxError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            })
            .await
            .map_err(map_tr_err)
    }

    async fn prepare(&self, busy_timeout: Duration, wal_mode: bool) -> Result<(), LockboxError> {
        self.conn
            .call(move |conn| -> Result<(), LockboxError> {
                conn.busy_timeout(busy_timeout).map_err(LockboxError::storage)?;
                let journal = if wal_mode { "WAL" } else { "DELETE" };
                conn.execute_batch(&format!(
                    "PRAGMA journal_mode = {journal};
                     PRAGMA synchronous = NORMAL;"
                ))
                .map_err(LockboxError::storage)?;
                migrations::run_migrations(conn)
            })
            .await
            .map_err(|e| match e {
                tokio_rusqlite::Error::Error(inner) => inner,
                other => LockboxError::Storage {
                    source: other.to_string().into(),
                },
            })
    }
}

/// Convert a tokio-rusqlite error into a storage error.
pub(crate) fn map_tr_err<E>(e: tokio_rusqlite::Error<E>) -> LockboxError
where
    E: std::error::Error + Send + Sync + 'static,
{
    match e {
        tokio_rusqlite::Error::Error(inner) => LockboxError::storage(inner),
        other => LockboxError::Storage {
            source: other.to_string().into(),
        },
    }
}
