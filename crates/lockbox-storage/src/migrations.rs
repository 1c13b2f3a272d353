// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations.
//!
//! The SQL files under `migrations/` are compiled into the binary by
//! `embed_migrations!`. Refinery records applied versions in
//! `refinery_schema_history`.

use lockbox_core::LockboxError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply every pending migration.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), LockboxError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(LockboxError::storage)?;
    for migration in report.applied_migrations() {
        tracing::info!(version = migration.version(), name = %migration.name(), "migration applied");
    }
    Ok(())
}
