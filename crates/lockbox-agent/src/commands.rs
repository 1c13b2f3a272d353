// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Menu keywords recognised regardless of conversation state.

use strum::{AsRefStr, EnumIter, EnumString};

/// Bot command that resets the conversation and greets the user.
pub const START_COMMAND: &str = "start";

/// Affirmative answer to the change-token confirmation.
pub const YES: &str = "Yes";

pub const NO: &str = "No";

/// A menu keyword, matched against the full message text.
///
/// `as_ref()` gives the text a user sends (or taps) to trigger it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, EnumIter)]
pub enum MenuCommand {
    #[strum(serialize = "1")]
    Set,
    #[strum(serialize = "2")]
    Get,
    #[strum(serialize = "3")]
    Delete,
    #[strum(serialize = "4")]
    UpdateToken,
    #[strum(serialize = "help")]
    Help,
    #[strum(serialize = "Back to menu <<")]
    BackToMenu,
}

impl MenuCommand {
    /// Exact, case-sensitive match of the whole text.
    pub fn parse(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}
