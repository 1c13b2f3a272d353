// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversational core of Lockbox.
//!
//! - [`state`]: per-user persisted conversation state
//! - [`dispatcher`]: interprets each inbound message against that state
//! - [`reveal`]: countdown-then-delete for messages that show a secret
//! - [`replies`]: user-facing texts and quick-reply keyboards

pub mod commands;
pub mod dispatcher;
pub mod replies;
pub mod reveal;
pub mod shutdown;
pub mod state;

pub use commands::MenuCommand;
pub use dispatcher::Dispatcher;
pub use reveal::RevealScheduler;
pub use shutdown::install_signal_handler;
pub use state::{Conversation, ConversationState, StateStore};
