// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation state store.
//!
//! One row per user holding the current [`ConversationState`] and the
//! service the user is working on. A missing row reads as the default.

use std::str::FromStr;
use std::sync::Arc;

use lockbox_core::{LockboxError, StorageAdapter, UserId};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::warn;

/// Where a user is in the conversation. Persisted by its camelCase name.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "camelCase")]
pub enum ConversationState {
    #[default]
    Default,
    SetToken,
    CheckToken,
    UpdateTokenConfirm,
    UpdateTokenInput,
    UpdateToken,
    SetService,
    SetUsername,
    SetPassword,
    GetService,
    DeleteService,
}

impl ConversationState {
    /// States in which `last_service` is meaningful.
    pub fn is_service_scoped(self) -> bool {
        matches!(self, Self::SetUsername | Self::SetPassword)
    }
}

/// A user's state together with the service pointer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    pub state: ConversationState,
    pub last_service: String,
}

impl Conversation {
    /// The service being edited, only while in a service-scoped state.
    pub fn scoped_service(&self) -> Option<&str> {
        (self.state.is_service_scoped() && !self.last_service.is_empty())
            .then_some(self.last_service.as_str())
    }
}

#[derive(Clone)]
pub struct StateStore {
    storage: Arc<dyn StorageAdapter>,
}

impl StateStore {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Current conversation of `user_id`; never fails for an unknown user.
    pub async fn get(&self, user_id: UserId) -> Result<Conversation, LockboxError> {
        let Some(record) = self.storage.get_state(user_id).await? else {
            return Ok(Conversation::default());
        };

        let state = ConversationState::from_str(&record.state).unwrap_or_else(|_| {
            warn!(user_id = %user_id, stored = %record.state, "unknown stored state, using default");
            ConversationState::Default
        });

        Ok(Conversation {
            state,
            last_service: record.last_service,
        })
    }

    pub async fn set_state(
        &self,
        user_id: UserId,
        state: ConversationState,
    ) -> Result<(), LockboxError> {
        self.storage.set_state(user_id, state.as_ref()).await
    }

    pub async fn set_last_service(&self, user_id: UserId, service: &str) -> Result<(), LockboxError> {
        self.storage.set_last_service(user_id, service).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_test_utils::MemoryStorage;
    use strum::IntoEnumIterator;

    #[test]
    fn persisted_names_are_camel_case() {
        assert_eq!(ConversationState::Default.as_ref(), "default");
        assert_eq!(ConversationState::SetToken.as_ref(), "setToken");
        assert_eq!(
            ConversationState::UpdateTokenConfirm.as_ref(),
            "updateTokenConfirm"
        );
        assert_eq!(ConversationState::DeleteService.to_string(), "deleteService");
    }

    #[test]
    fn every_state_parses_back() {
        for state in ConversationState::iter() {
            assert_eq!(ConversationState::from_str(state.as_ref()), Ok(state));
        }
        assert_eq!(ConversationState::iter().count(), 11);
    }

    #[test]
    fn last_service_only_trusted_in_scoped_states() {
        let mut conversation = Conversation {
            state: ConversationState::GetService,
            last_service: "github".into(),
        };
        assert_eq!(conversation.scoped_service(), None);

        conversation.state = ConversationState::SetPassword;
        assert_eq!(conversation.scoped_service(), Some("github"));

        conversation.last_service.clear();
        assert_eq!(conversation.scoped_service(), None);
    }

    #[tokio::test]
    async fn fresh_user_reads_default() {
        let store = StateStore::new(Arc::new(MemoryStorage::new()));
        let conversation = store.get(UserId(9)).await.unwrap();
        assert_eq!(conversation.state, ConversationState::Default);
        assert_eq!(conversation.last_service, "");
    }

    #[tokio::test]
    async fn setters_are_independent() {
        let store = StateStore::new(Arc::new(MemoryStorage::new()));
        let user = UserId(9);

        store.set_last_service(user, "mail").await.unwrap();
        store
            .set_state(user, ConversationState::SetUsername)
            .await
            .unwrap();
        store
            .set_state(user, ConversationState::SetPassword)
            .await
            .unwrap();

        let conversation = store.get(user).await.unwrap();
        assert_eq!(conversation.state, ConversationState::SetPassword);
        assert_eq!(conversation.last_service, "mail");
    }

    #[tokio::test]
    async fn unknown_stored_state_reads_as_default() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_state(UserId(1), "mystery").await.unwrap();

        let store = StateStore::new(storage);
        assert_eq!(
            store.get(UserId(1)).await.unwrap().state,
            ConversationState::Default
        );
    }
}
