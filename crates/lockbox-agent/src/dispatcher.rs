// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation state machine.
//!
//! Every inbound message is interpreted against the sender's persisted
//! [`Conversation`]. A handler performs its vault operation first, then
//! sends exactly one reply, then advances the state. If any step fails the
//! error is returned and the remaining steps are skipped, so the state is
//! never advanced past a failed write.
//!
//! Handling order:
//! 1. a sender without a master token is greeted and asked for one
//! 2. while a token is being chosen, menu keywords are refused
//! 3. `/start` resets to the main menu
//! 4. menu keywords win over whatever the current state expects
//! 5. everything else goes to the handler of the current state

use std::sync::Arc;

use lockbox_core::{
    InboundMessage, LockboxError, MessageTransport, SendOptions, SentMessage, StorageAdapter, UserId,
};
use lockbox_vault::{CredentialVault, EncryptionKey, Lookup, TokenVerdict};
use secrecy::ExposeSecret;
use tracing::{debug, error, info};

use crate::commands::{MenuCommand, START_COMMAND, YES};
use crate::replies;
use crate::reveal::RevealScheduler;
use crate::state::{Conversation, ConversationState, StateStore};

pub struct Dispatcher {
    vault: CredentialVault,
    states: StateStore,
    transport: Arc<dyn MessageTransport>,
    reveals: RevealScheduler,
    key: EncryptionKey,
}

impl Dispatcher {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        transport: Arc<dyn MessageTransport>,
        reveals: RevealScheduler,
        key: EncryptionKey,
    ) -> Self {
        Self {
            vault: CredentialVault::new(Arc::clone(&storage)),
            states: StateStore::new(storage),
            transport,
            reveals,
            key,
        }
    }

    /// Handle one inbound message to completion.
    pub async fn dispatch(&self, msg: &InboundMessage) -> Result<(), LockboxError> {
        let user = msg.sender_id;
        let registered = self.vault.user_exists(user).await?;
        let conversation = self.states.get(user).await?;
        debug!(user_id = %user, state = %conversation.state, registered, "dispatching message");

        if !registered && conversation.state != ConversationState::SetToken {
            return self.greet_new_user(msg).await;
        }

        let menu = MenuCommand::parse(&msg.text);

        if conversation.state == ConversationState::SetToken && menu.is_some() {
            self.reply(msg, replies::TOKEN_IS_COMMAND, SendOptions::default())
                .await?;
            return Ok(());
        }

        if msg.command.as_deref() == Some(START_COMMAND) {
            self.abandon(user, &conversation).await?;
            if !registered {
                return self.greet_new_user(msg).await;
            }
            self.reply(
                msg,
                &replies::welcome_back(msg.sender_username.as_deref(), user),
                SendOptions {
                    reply_markup: Some(replies::menu_keyboard()),
                    ..SendOptions::markdown()
                },
            )
            .await?;
            return self.advance(user, ConversationState::Default).await;
        }

        if let Some(command) = menu {
            self.abandon(user, &conversation).await?;
            return self.on_menu(msg, command).await;
        }

        self.on_state(msg, &conversation).await
    }

    async fn on_menu(&self, msg: &InboundMessage, command: MenuCommand) -> Result<(), LockboxError> {
        let user = msg.sender_id;
        match command {
            MenuCommand::Help | MenuCommand::BackToMenu => self.show_help(msg).await,
            MenuCommand::Set => {
                self.reply(msg, replies::ASK_SERVICE, back_to_menu()).await?;
                self.advance(user, ConversationState::SetService).await
            }
            MenuCommand::Get => {
                self.reply(msg, replies::ASK_TOKEN, back_to_menu()).await?;
                self.advance(user, ConversationState::CheckToken).await
            }
            MenuCommand::Delete => {
                let services = self.vault.list_service_names(user).await?;
                self.reply(
                    msg,
                    replies::ASK_SERVICE,
                    SendOptions::with_keyboard(replies::services_keyboard(&services)),
                )
                .await?;
                self.advance(user, ConversationState::DeleteService).await
            }
            MenuCommand::UpdateToken => self.confirm_token_update(msg).await,
        }
    }

    async fn on_state(
        &self,
        msg: &InboundMessage,
        conversation: &Conversation,
    ) -> Result<(), LockboxError> {
        let user = msg.sender_id;
        let text = msg.text.as_str();

        match conversation.state {
            ConversationState::Default => self.show_help(msg).await,

            ConversationState::SetToken => {
                self.vault
                    .create_or_set_master_token(user, text, &self.key)
                    .await?;
                self.reply(msg, replies::TOKEN_SAVED, main_menu()).await?;
                self.advance(user, ConversationState::Default).await
            }

            ConversationState::CheckToken => {
                match self.vault.verify_master_token(user, text, &self.key).await? {
                    TokenVerdict::Match => {
                        let services = self.vault.list_service_names(user).await?;
                        self.reply(
                            msg,
                            replies::ASK_SERVICE_AFTER_CHECK,
                            SendOptions::with_keyboard(replies::services_keyboard(&services)),
                        )
                        .await?;
                        self.advance(user, ConversationState::GetService).await
                    }
                    TokenVerdict::Mismatch => {
                        self.reply(msg, replies::WRONG_TOKEN, back_to_menu()).await?;
                        Ok(())
                    }
                    TokenVerdict::Unreadable => {
                        error!(user_id = %user, "master token cannot be decrypted with the configured key");
                        self.reply(msg, replies::TOKEN_UNREADABLE, main_menu()).await?;
                        self.advance(user, ConversationState::Default).await
                    }
                }
            }

            ConversationState::UpdateTokenConfirm => self.confirm_token_update(msg).await,

            ConversationState::UpdateTokenInput => {
                if text != YES {
                    return self.show_help(msg).await;
                }
                self.reply(msg, replies::ASK_NEW_TOKEN, back_to_menu()).await?;
                self.advance(user, ConversationState::UpdateToken).await
            }

            ConversationState::UpdateToken => {
                self.vault.update_master_token(user, text, &self.key).await?;
                self.reply(msg, replies::TOKEN_UPDATED, main_menu()).await?;
                self.advance(user, ConversationState::Default).await
            }

            ConversationState::SetService => {
                self.vault.set_service(user, text).await?;
                self.states.set_last_service(user, text).await?;
                self.reply(msg, replies::ASK_USERNAME, back_to_menu()).await?;
                self.advance(user, ConversationState::SetUsername).await
            }

            ConversationState::SetUsername => {
                let Some(service) = conversation.scoped_service() else {
                    return self.show_help(msg).await;
                };
                self.vault.set_username(user, service, text).await?;
                self.reply(msg, replies::ASK_PASSWORD, back_to_menu()).await?;
                self.advance(user, ConversationState::SetPassword).await
            }

            ConversationState::SetPassword => {
                let Some(service) = conversation.scoped_service() else {
                    return self.show_help(msg).await;
                };
                self.vault
                    .set_password(user, service, text, &self.key)
                    .await?;
                info!(user_id = %user, service, "credential saved");

                match self.vault.get(user, service, &self.key).await? {
                    Lookup::Found(credential) => {
                        let body = replies::saved_credentials(
                            &credential.service,
                            &credential.username,
                            credential.password.expose_secret(),
                        );
                        let options = SendOptions {
                            reply_to: Some(msg.message_id),
                            ..SendOptions::markdown()
                        };
                        self.reveal(msg, body, options).await?;
                    }
                    Lookup::Incomplete | Lookup::NotFound => {
                        self.reply(msg, replies::SERVICE_NOT_FOUND, main_menu()).await?;
                    }
                }
                self.advance(user, ConversationState::Default).await
            }

            ConversationState::GetService => {
                match self.vault.get(user, text, &self.key).await? {
                    Lookup::Found(credential) => {
                        let body = replies::credentials(
                            &credential.service,
                            &credential.username,
                            credential.password.expose_secret(),
                        );
                        self.reveal(msg, body, SendOptions::markdown()).await?;
                    }
                    Lookup::Incomplete | Lookup::NotFound => {
                        debug!(user_id = %user, "requested service not found");
                        self.reply(msg, replies::SERVICE_NOT_FOUND, main_menu()).await?;
                    }
                }
                self.advance(user, ConversationState::Default).await
            }

            ConversationState::DeleteService => {
                self.vault.delete(user, text).await?;
                info!(user_id = %user, service = text, "credential deleted");
                self.reply(msg, replies::DELETED, main_menu()).await?;
                self.advance(user, ConversationState::Default).await
            }
        }
    }

    async fn greet_new_user(&self, msg: &InboundMessage) -> Result<(), LockboxError> {
        info!(user_id = %msg.sender_id, "new user, asking for a master token");
        self.reply(
            msg,
            &replies::welcome(msg.sender_username.as_deref(), msg.sender_id),
            SendOptions::markdown(),
        )
        .await?;
        self.advance(msg.sender_id, ConversationState::SetToken).await
    }

    async fn show_help(&self, msg: &InboundMessage) -> Result<(), LockboxError> {
        self.reply(msg, replies::HELP, main_menu()).await?;
        self.advance(msg.sender_id, ConversationState::Default).await
    }

    async fn confirm_token_update(&self, msg: &InboundMessage) -> Result<(), LockboxError> {
        self.reply(
            msg,
            replies::CONFIRM_UPDATE,
            SendOptions::with_keyboard(replies::yes_no_keyboard()),
        )
        .await?;
        self.advance(msg.sender_id, ConversationState::UpdateTokenInput)
            .await
    }

    /// Cleanup for leaving the current flow early.
    ///
    /// A credential whose password was never entered is removed; one that
    /// only lacks a username is kept. Re-entering an existing service goes
    /// through the same states, so leaving at the password prompt removes
    /// the previously stored credential as well.
    async fn abandon(&self, user: UserId, conversation: &Conversation) -> Result<(), LockboxError> {
        if conversation.state != ConversationState::SetPassword {
            return Ok(());
        }
        if let Some(service) = conversation.scoped_service() {
            info!(user_id = %user, service, "discarding half-entered credential");
            self.vault.delete(user, service).await?;
        }
        Ok(())
    }

    async fn reveal(
        &self,
        msg: &InboundMessage,
        body: String,
        options: SendOptions,
    ) -> Result<(), LockboxError> {
        let sent = self.reply(msg, &body, options).await?;
        self.reveals.schedule(sent, body);
        Ok(())
    }

    async fn reply(
        &self,
        msg: &InboundMessage,
        text: &str,
        options: SendOptions,
    ) -> Result<SentMessage, LockboxError> {
        self.transport.send(msg.chat_id, text, options).await
    }

    async fn advance(&self, user: UserId, next: ConversationState) -> Result<(), LockboxError> {
        self.states.set_state(user, next).await?;
        debug!(user_id = %user, state = %next, "state advanced");
        Ok(())
    }
}

fn main_menu() -> SendOptions {
    SendOptions::with_keyboard(replies::menu_keyboard())
}

fn back_to_menu() -> SendOptions {
    SendOptions::with_keyboard(replies::back_to_menu_keyboard())
}
