// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for Lockbox.
//!
//! - [`MemoryStorage`]: an in-memory [`lockbox_core::StorageAdapter`]
//! - [`MockTransport`]: a [`lockbox_core::MessageTransport`] that records every call

pub mod memory_storage;
pub mod mock_transport;

pub use memory_storage::MemoryStorage;
pub use mock_transport::{MockTransport, TransportCall};
