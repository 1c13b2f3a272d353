// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording message transport.
//!
//! `MockTransport` hands out sequential message ids and records every send,
//! edit and delete so tests can assert on what a user would have seen.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use lockbox_core::{
    AdapterType, ChatId, HealthStatus, LockboxError, MessageId, MessageTransport, PluginAdapter,
    SendOptions, SentMessage,
};

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Sent {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        options: SendOptions,
    },
    Edited {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
    },
    Deleted {
        chat_id: ChatId,
        message_id: MessageId,
    },
}

pub struct MockTransport {
    calls: Mutex<Vec<TransportCall>>,
    next_id: AtomicI32,
    fail_sends: AtomicBool,
    fail_edits: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(1000),
            fail_sends: AtomicBool::new(false),
            fail_edits: AtomicBool::new(false),
        }
    }

    /// Make `send` fail until reset.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Make `edit` fail until reset.
    pub fn set_fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }

    pub async fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().await.clone()
    }

    /// Texts and options of every successful send, in order.
    pub async fn sent(&self) -> Vec<(String, SendOptions)> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                TransportCall::Sent { text, options, .. } => Some((text.clone(), options.clone())),
                _ => None,
            })
            .collect()
    }

    /// Text of the most recent send.
    pub async fn last_sent_text(&self) -> Option<String> {
        self.sent().await.pop().map(|(text, _)| text)
    }

    pub async fn edits_of(&self, message_id: MessageId) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                TransportCall::Edited {
                    message_id: id,
                    text,
                    ..
                } if *id == message_id => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn deleted(&self) -> Vec<MessageId> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                TransportCall::Deleted { message_id, .. } => Some(*message_id),
                _ => None,
            })
            .collect()
    }

    pub async fn clear(&self) {
        self.calls.lock().await.clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, LockboxError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LockboxError> {
        Ok(())
    }
}

#[async_trait]
impl MessageTransport for MockTransport {
    async fn send(
        &self,
        chat_id: ChatId,
        text: &str,
        options: SendOptions,
    ) -> Result<SentMessage, LockboxError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(LockboxError::transport("mock send failure", None));
        }
        let message_id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.calls.lock().await.push(TransportCall::Sent {
            chat_id,
            message_id,
            text: text.to_string(),
            options,
        });
        Ok(SentMessage {
            chat_id,
            message_id,
        })
    }

    async fn edit(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        _options: SendOptions,
    ) -> Result<(), LockboxError> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(LockboxError::transport("mock edit failure", None));
        }
        self.calls.lock().await.push(TransportCall::Edited {
            chat_id,
            message_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), LockboxError> {
        self.calls.lock().await.push(TransportCall::Deleted {
            chat_id,
            message_id,
        });
        Ok(())
    }
}
