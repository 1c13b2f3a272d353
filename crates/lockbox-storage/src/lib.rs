// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for Lockbox.
//!
//! A single `tokio-rusqlite` connection serializes every statement on one
//! background thread, so each query is atomic. Schema changes ship as
//! embedded refinery migrations and run when the database is opened.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
