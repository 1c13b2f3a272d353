// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook update decoding.
//!
//! Only text messages with a known sender become an [`InboundMessage`].
//! Everything else (edits, channel posts, stickers, callback queries) is
//! acknowledged upstream and dropped here.

use lockbox_core::{ChatId, InboundMessage, MessageId, UserId};
use teloxide::types::{Update, UpdateKind};
use tracing::debug;

/// Decode a raw webhook body.
pub fn decode_payload(body: &[u8]) -> Option<InboundMessage> {
    match serde_json::from_slice::<Update>(body) {
        Ok(update) => decode_update(&update),
        Err(e) => {
            debug!(error = %e, "ignoring undecodable update");
            None
        }
    }
}

pub fn decode_update(update: &Update) -> Option<InboundMessage> {
    let UpdateKind::Message(msg) = &update.kind else {
        debug!(update_id = update.id.0, "ignoring non-message update");
        return None;
    };

    let Some(from) = msg.from.as_ref() else {
        debug!(msg_id = msg.id.0, "ignoring message without sender");
        return None;
    };

    let Some(text) = msg.text() else {
        debug!(msg_id = msg.id.0, "ignoring non-text message");
        return None;
    };

    let sender_id = i64::try_from(from.id.0).ok()?;

    Some(InboundMessage {
        sender_id: UserId(sender_id),
        sender_username: from.username.clone(),
        chat_id: ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
        text: text.to_string(),
        command: command_name(text),
    })
}

/// `/start@lockbox_bot arg` → `start`.
fn command_name(text: &str) -> Option<String> {
    let head = text.split_whitespace().next()?.strip_prefix('/')?;
    let name = head.split('@').next().unwrap_or(head);
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_update(text: serde_json::Value) -> Vec<u8> {
        let mut message = serde_json::json!({
            "message_id": 7,
            "date": 1_700_000_000,
            "chat": {"id": 42, "type": "private", "first_name": "Alice"},
            "from": {"id": 42, "is_bot": false, "first_name": "Alice", "username": "alice"}
        });
        if !text.is_null() {
            message["text"] = text;
        }
        serde_json::to_vec(&serde_json::json!({"update_id": 1, "message": message})).unwrap()
    }

    #[test]
    fn text_message_is_decoded() {
        let msg = decode_payload(&message_update("hello".into())).unwrap();
        assert_eq!(msg.sender_id, UserId(42));
        assert_eq!(msg.sender_username.as_deref(), Some("alice"));
        assert_eq!(msg.chat_id, ChatId(42));
        assert_eq!(msg.message_id, MessageId(7));
        assert_eq!(msg.text, "hello");
        assert_eq!(msg.command, None);
    }

    #[test]
    fn command_is_normalised() {
        let msg = decode_payload(&message_update("/start@lockbox_bot".into())).unwrap();
        assert_eq!(msg.command.as_deref(), Some("start"));
        assert_eq!(msg.text, "/start@lockbox_bot");
    }

    #[test]
    fn message_without_text_is_ignored() {
        assert!(decode_payload(&message_update(serde_json::Value::Null)).is_none());
    }

    #[test]
    fn garbage_is_ignored() {
        assert!(decode_payload(b"not json").is_none());
        assert!(decode_payload(b"{}").is_none());
    }

    #[test]
    fn command_names() {
        assert_eq!(command_name("/start"), Some("start".into()));
        assert_eq!(command_name("/help me"), Some("help".into()));
        assert_eq!(command_name("/"), None);
        assert_eq!(command_name("start"), None);
        assert_eq!(command_name(""), None);
    }
}
