// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One module per collection: `users`, `credentials`, `state`.

pub mod credentials;
pub mod state;
pub mod users;
