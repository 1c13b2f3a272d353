// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply texts and quick-reply keyboards.
//!
//! Texts sent with MarkdownV2 escape every user-supplied fragment: plain
//! fragments with [`escape_markdown_v2`], code spans with [`escape_code`].

use lockbox_core::{Keyboard, UserId};

use crate::commands::{MenuCommand, NO, YES};

/// Buttons per row on the service picker.
pub const SERVICES_PER_ROW: usize = 4;

pub const HELP: &str = "1. Set credentials for service. 🔒\n\
2. Get login and password of service. 🔑\n\
3. Delete service. ❌\n\
4. Change security password. 🔃\n\n\
Enter the number of the desired action:";

pub const TOKEN_IS_COMMAND: &str = "Security password can't be a command, write it again";
pub const ASK_TOKEN: &str = "Enter security password:";
pub const WRONG_TOKEN: &str = "Wrong security password.\nTry again:";
pub const TOKEN_UNREADABLE: &str = "Your security password can no longer be read. \
Choose 4 to set a new one (this deletes your stored passwords).";
pub const CONFIRM_UPDATE: &str = "This will delete all your passwords.\nAre you sure?";
pub const ASK_NEW_TOKEN: &str = "Enter new security password:";
pub const TOKEN_SAVED: &str = "Security password saved successfully! ✅";
pub const TOKEN_UPDATED: &str = "Security password updated successfully! ✅";
pub const ASK_SERVICE: &str = "Enter service:";
pub const ASK_SERVICE_AFTER_CHECK: &str = "Correct ✅\nEnter service:";
pub const ASK_USERNAME: &str = "Enter username:";
pub const ASK_PASSWORD: &str = "Enter password:";
pub const SERVICE_NOT_FOUND: &str = "Service not found!";
pub const DELETED: &str = "Successfully deleted! ✅";
pub const TRY_AGAIN_LATER: &str = "Sorry, I can't handle your request\nTry again later ⛔";

/// Characters MarkdownV2 requires to be escaped outside code spans.
const SPECIAL_CHARS: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

/// Escape text for use outside code spans.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        if SPECIAL_CHARS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Escape text for use inside an inline code span.
pub fn escape_code(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 4);
    for ch in text.chars() {
        if ch == '`' || ch == '\\' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn mention(username: Option<&str>, user_id: UserId) -> String {
    let name = escape_markdown_v2(username.filter(|u| !u.is_empty()).unwrap_or("friend"));
    format!("[{name}](tg://user?id={user_id})")
}

/// First-contact greeting (MarkdownV2).
pub fn welcome(username: Option<&str>, user_id: UserId) -> String {
    format!(
        "Hello, {}\\!\n\
         I'm a password manager bot\\.\n\
         For security purposes, I will ask you to enter your security password\\.\n\
         *If it is lost, all data will be deleted*\\. Be careful\\!\n\n\
         Enter your security password:",
        mention(username, user_id)
    )
}

/// Greeting after `/start` for a registered user (MarkdownV2).
pub fn welcome_back(username: Option<&str>, user_id: UserId) -> String {
    format!(
        "Hello again, {}\\!\n\nEnter what you want to do:",
        mention(username, user_id)
    )
}

fn credential_lines(heading: &str, service: &str, username: &str, password: &str) -> String {
    format!(
        "{heading} for {}:\nUsername: `{}`\nPassword: `{}`",
        escape_markdown_v2(service),
        escape_code(username),
        escape_code(password)
    )
}

/// Reveal after a lookup (MarkdownV2).
pub fn credentials(service: &str, username: &str, password: &str) -> String {
    credential_lines("Your credentials", service, username, password)
}

/// Reveal right after the password was stored (MarkdownV2).
pub fn saved_credentials(service: &str, username: &str, password: &str) -> String {
    format!(
        "Successfully saved\\! ✅\n{}",
        credential_lines("Your new credentials", service, username, password)
    )
}

/// A reveal text with the remaining lifetime appended.
pub fn countdown(reveal: &str, remaining_secs: u64) -> String {
    format!("{reveal}\n\nThis message will be deleted in {remaining_secs} seconds")
}

pub fn menu_keyboard() -> Keyboard {
    Keyboard::new([
        vec![
            MenuCommand::Set.as_ref(),
            MenuCommand::Get.as_ref(),
            MenuCommand::Delete.as_ref(),
        ],
        vec![MenuCommand::Help.as_ref()],
    ])
}

pub fn back_to_menu_keyboard() -> Keyboard {
    Keyboard::new([[MenuCommand::BackToMenu.as_ref()]])
}

pub fn yes_no_keyboard() -> Keyboard {
    Keyboard::new([[YES, NO]])
}

/// The user's services, [`SERVICES_PER_ROW`] per row, then "Back to menu".
pub fn services_keyboard(services: &[String]) -> Keyboard {
    let mut rows: Vec<Vec<String>> = services
        .chunks(SERVICES_PER_ROW)
        .map(<[String]>::to_vec)
        .collect();
    rows.push(vec![MenuCommand::BackToMenu.as_ref().to_string()]);
    Keyboard { rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_every_special_character() {
        assert_eq!(escape_markdown_v2("a.b!c"), "a\\.b\\!c");
        assert_eq!(escape_markdown_v2("my-site_1 (x)"), "my\\-site\\_1 \\(x\\)");
        assert_eq!(escape_markdown_v2("plain"), "plain");
    }

    #[test]
    fn code_spans_escape_only_backtick_and_backslash() {
        assert_eq!(escape_code("p@ss.w*rd"), "p@ss.w*rd");
        assert_eq!(escape_code("a`b\\c"), "a\\`b\\\\c");
    }

    #[test]
    fn welcome_mentions_user() {
        let text = welcome(Some("alice_1"), UserId(77));
        assert!(text.starts_with("Hello, [alice\\_1](tg://user?id=77)\\!"));
        assert!(text.ends_with("Enter your security password:"));
    }

    #[test]
    fn welcome_without_username_still_links() {
        let text = welcome_back(None, UserId(5));
        assert!(text.contains("[friend](tg://user?id=5)"));
    }

    #[test]
    fn credentials_escape_user_data() {
        let text = credentials("git.hub", "al`ice", "p.w");
        assert_eq!(
            text,
            "Your credentials for git\\.hub:\nUsername: `al\\`ice`\nPassword: `p.w`"
        );
    }

    #[test]
    fn saved_credentials_wording() {
        let text = saved_credentials("mail", "a", "b");
        assert!(text.starts_with("Successfully saved\\! ✅\nYour new credentials for mail:"));
    }

    #[test]
    fn countdown_appends_remaining_seconds() {
        assert_eq!(
            countdown("x", 3),
            "x\n\nThis message will be deleted in 3 seconds"
        );
    }

    #[test]
    fn menu_layout() {
        assert_eq!(
            menu_keyboard().rows,
            vec![vec!["1", "2", "3"], vec!["help"]]
        );
    }

    #[test]
    fn service_picker_wraps_rows_and_ends_with_back() {
        let services: Vec<String> = (0..6).map(|i| format!("s{i}")).collect();
        let keyboard = services_keyboard(&services);
        assert_eq!(keyboard.rows.len(), 3);
        assert_eq!(keyboard.rows[0].len(), SERVICES_PER_ROW);
        assert_eq!(keyboard.rows[1], vec!["s4", "s5"]);
        assert_eq!(keyboard.rows[2], vec!["Back to menu <<"]);
    }

    #[test]
    fn empty_service_picker_has_only_back() {
        assert_eq!(services_keyboard(&[]).rows, vec![vec!["Back to menu <<"]]);
    }
}
