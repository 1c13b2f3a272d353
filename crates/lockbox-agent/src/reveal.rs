// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ephemeral reveal countdowns.
//!
//! A message that shows a secret is edited once per second with the time it
//! has left and deleted when the countdown reaches zero. Scheduling the same
//! message again cancels the running countdown and starts a fresh one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use lockbox_core::{ChatId, MessageId, MessageTransport, SendOptions, SentMessage};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::replies;

const TICK: Duration = Duration::from_secs(1);

type RevealKey = (ChatId, MessageId);

struct PendingReveal {
    generation: u64,
    cancel: CancellationToken,
}

struct Inner {
    transport: Arc<dyn MessageTransport>,
    lifetime_secs: u64,
    pending: DashMap<RevealKey, PendingReveal>,
    generation: AtomicU64,
}

/// Schedules countdown edits and the final deletion of revealed messages.
///
/// Cheap to clone; clones share the same set of pending countdowns.
#[derive(Clone)]
pub struct RevealScheduler {
    inner: Arc<Inner>,
}

impl RevealScheduler {
    /// `lifetime_secs` of zero deletes revealed messages right away.
    pub fn new(transport: Arc<dyn MessageTransport>, lifetime_secs: u64) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                lifetime_secs,
                pending: DashMap::new(),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn lifetime_secs(&self) -> u64 {
        self.inner.lifetime_secs
    }

    /// Number of countdowns still running.
    pub fn pending(&self) -> usize {
        self.inner.pending.len()
    }

    /// Start the countdown for `message`, whose current body is `reveal`
    /// (MarkdownV2).
    pub fn schedule(&self, message: SentMessage, reveal: String) {
        let key = (message.chat_id, message.message_id);
        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();

        if let Some(previous) = self.inner.pending.insert(
            key,
            PendingReveal {
                generation,
                cancel: cancel.clone(),
            },
        ) {
            debug!(chat_id = %key.0, message_id = %key.1, "replacing running countdown");
            previous.cancel.cancel();
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let ticker = Arc::clone(&inner);
            let ticks = tokio::spawn(async move { ticker.count_down(key, reveal, cancel).await });
            if let Err(e) = ticks.await {
                error!(chat_id = %key.0, message_id = %key.1, error = %e, "countdown aborted");
            }
            inner.finish(key, generation).await;
        });
    }

    /// Cancel every running countdown and delete its message now.
    pub async fn shutdown(&self) {
        let keys: Vec<RevealKey> = self.inner.pending.iter().map(|entry| *entry.key()).collect();
        if keys.is_empty() {
            return;
        }

        info!(count = keys.len(), "flushing pending reveals");
        for key in keys {
            if let Some((_, pending)) = self.inner.pending.remove(&key) {
                pending.cancel.cancel();
                self.inner.delete(key).await;
            }
        }
    }
}

impl Inner {
    async fn count_down(&self, key: RevealKey, reveal: String, cancel: CancellationToken) {
        for remaining in (1..=self.lifetime_secs).rev() {
            if cancel.is_cancelled() {
                return;
            }

            let text = replies::countdown(&reveal, remaining);
            if let Err(e) = self
                .transport
                .edit(key.0, key.1, &text, SendOptions::markdown())
                .await
            {
                warn!(chat_id = %key.0, message_id = %key.1, error = %e, "countdown edit failed");
            }

            tokio::select! {
                _ = tokio::time::sleep(TICK) => {}
                _ = cancel.cancelled() => return,
            }
        }
    }

    /// Runs however the countdown ended. A cancelled countdown no longer
    /// owns its entry, so this is a no-op for it.
    async fn finish(&self, key: RevealKey, generation: u64) {
        // Whoever removes the entry owns the deletion.
        if self
            .pending
            .remove_if(&key, |_, pending| pending.generation == generation)
            .is_some()
        {
            self.delete(key).await;
        }
    }

    async fn delete(&self, (chat_id, message_id): RevealKey) {
        match self.transport.delete(chat_id, message_id).await {
            Ok(()) => debug!(chat_id = %chat_id, message_id = %message_id, "revealed message deleted"),
            Err(e) => {
                warn!(chat_id = %chat_id, message_id = %message_id, error = %e, "failed to delete revealed message")
            }
        }
    }
}
