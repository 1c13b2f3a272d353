// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential rows, keyed by `(user_id, service_name)`.

use lockbox_core::{CredentialRecord, LockboxError, UserId};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Create the row with no username or password. Existing rows are untouched.
pub async fn upsert_service(db: &Database, user_id: UserId, service: &str) -> Result<(), LockboxError> {
    let service = service.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO credentials (user_id, service_name) VALUES (?1, ?2)
                 ON CONFLICT(user_id, service_name) DO NOTHING",
                params![user_id.0, service],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_username(
    db: &Database,
    user_id: UserId,
    service: &str,
    username: &str,
) -> Result<(), LockboxError> {
    let (service, username) = (service.to_string(), username.to_string());
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO credentials (user_id, service_name, username) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id, service_name) DO UPDATE SET username = excluded.username",
                params![user_id.0, service, username],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_password(
    db: &Database,
    user_id: UserId,
    service: &str,
    encrypted_password: Vec<u8>,
) -> Result<(), LockboxError> {
    let service = service.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO credentials (user_id, service_name, encrypted_password) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id, service_name)
                 DO UPDATE SET encrypted_password = excluded.encrypted_password",
                params![user_id.0, service, encrypted_password],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_credential(
    db: &Database,
    user_id: UserId,
    service: &str,
) -> Result<Option<CredentialRecord>, LockboxError> {
    let service = service.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<CredentialRecord>, rusqlite::Error> {
            conn.query_row(
                "SELECT username, encrypted_password FROM credentials
                 WHERE user_id = ?1 AND service_name = ?2",
                params![user_id.0, service],
                |row| {
                    Ok(CredentialRecord {
                        user_id,
                        service_name: service.clone(),
                        username: row.get(0)?,
                        encrypted_password: row.get(1)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Service names owned by `user_id`, alphabetical, at most `limit`.
pub async fn list_services(
    db: &Database,
    user_id: UserId,
    limit: usize,
) -> Result<Vec<String>, LockboxError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT service_name FROM credentials WHERE user_id = ?1
                 ORDER BY service_name LIMIT ?2",
            )?;
            let names = stmt
                .query_map(params![user_id.0, limit], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(names)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete_credential(db: &Database, user_id: UserId, service: &str) -> Result<(), LockboxError> {
    let service = service.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "DELETE FROM credentials WHERE user_id = ?1 AND service_name = ?2",
                params![user_id.0, service],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Remove every credential of `user_id`, returning the number of rows removed.
pub async fn delete_credentials_for_user(db: &Database, user_id: UserId) -> Result<u64, LockboxError> {
    db.connection()
        .call(move |conn| -> Result<u64, rusqlite::Error> {
            let removed = conn.execute(
                "DELETE FROM credentials WHERE user_id = ?1",
                params![user_id.0],
            )?;
            Ok(removed as u64)
        })
        .await
        .map_err(map_tr_err)
}
