// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master token rows.

use lockbox_core::{LockboxError, UserId, UserRecord};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

pub async fn get_user(db: &Database, user_id: UserId) -> Result<Option<UserRecord>, LockboxError> {
    db.connection()
        .call(move |conn| -> Result<Option<UserRecord>, rusqlite::Error> {
            conn.query_row(
                "SELECT encrypted_token FROM users WHERE user_id = ?1",
                params![user_id.0],
                |row| {
                    Ok(UserRecord {
                        user_id,
                        encrypted_token: row.get(0)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert the user, or replace the stored token of an existing one.
pub async fn upsert_user(
    db: &Database,
    user_id: UserId,
    encrypted_token: Vec<u8>,
) -> Result<(), LockboxError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO users (user_id, encrypted_token) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET encrypted_token = excluded.encrypted_token",
                params![user_id.0, encrypted_token],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
