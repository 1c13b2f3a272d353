// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation state rows. Both setters upsert and leave the other column alone.

use lockbox_core::{LockboxError, StateRecord, UserId};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

pub async fn get_state(db: &Database, user_id: UserId) -> Result<Option<StateRecord>, LockboxError> {
    db.connection()
        .call(move |conn| -> Result<Option<StateRecord>, rusqlite::Error> {
            conn.query_row(
                "SELECT state, last_service FROM state WHERE user_id = ?1",
                params![user_id.0],
                |row| {
                    Ok(StateRecord {
                        user_id,
                        state: row.get(0)?,
                        last_service: row.get(1)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_state(db: &Database, user_id: UserId, state: &str) -> Result<(), LockboxError> {
    let state = state.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO state (user_id, state) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET state = excluded.state",
                params![user_id.0, state],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_last_service(db: &Database, user_id: UserId, service: &str) -> Result<(), LockboxError> {
    let service = service.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO state (user_id, last_service) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET last_service = excluded.last_service",
                params![user_id.0, service],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
