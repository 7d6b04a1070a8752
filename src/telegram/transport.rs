//! `ChatTransport` backed by the Telegram Bot API.

use std::collections::HashSet;

use async_trait::async_trait;
use teloxide::payloads::{EditMessageTextSetters, SendMessageSetters};
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, ChatMember, ChatMemberKind, ChatMemberStatus, MessageId, ParseMode, UserId,
};
use teloxide::{ApiError, RequestError};

use crate::error::{Error, Result};
use crate::transport::{ChatTransport, MessageContent, MessageHandle, UserProfile};

use super::format::rich_to_html;

/// Telegram transport.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    async fn chat_member(&self, channel_id: i64, user_id: &str) -> Result<ChatMember> {
        let id: u64 = user_id
            .parse()
            .map_err(|_| Error::NotFound(format!("'{}' is not a Telegram user ID", user_id)))?;
        Ok(self.bot.get_chat_member(ChatId(channel_id), UserId(id)).await?)
    }
}

/// Telegram rejects edits that leave the text unchanged.
pub fn is_not_modified(e: &RequestError) -> bool {
    matches!(e, RequestError::Api(ApiError::MessageNotModified))
}

/// An edit that changed nothing still leaves the message in the wanted state.
fn settle_edit<T>(result: std::result::Result<T, RequestError>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if is_not_modified(&e) => {
            tracing::debug!("Edit skipped, message already up to date");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Role names for a chat member: its status plus an admin's custom title.
pub fn member_roles(member: &ChatMember) -> HashSet<String> {
    let status = match member.status() {
        ChatMemberStatus::Owner => "owner",
        ChatMemberStatus::Administrator => "administrator",
        ChatMemberStatus::Member => "member",
        ChatMemberStatus::Restricted => "restricted",
        ChatMemberStatus::Left => "left",
        ChatMemberStatus::Banned => "banned",
    };

    let mut roles = HashSet::from([status.to_string()]);
    let title = match &member.kind {
        ChatMemberKind::Owner(owner) => owner.custom_title.clone(),
        ChatMemberKind::Administrator(admin) => admin.custom_title.clone(),
        _ => None,
    };
    if let Some(title) = title {
        roles.insert(title);
    }
    roles
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn publish_message(
        &self,
        channel_id: i64,
        content: MessageContent,
    ) -> Result<MessageHandle> {
        let chat = ChatId(channel_id);
        let sent = match content {
            MessageContent::Plain(text) => self.bot.send_message(chat, text).await?,
            MessageContent::Rich(rich) => {
                self.bot
                    .send_message(chat, rich_to_html(&rich))
                    .parse_mode(ParseMode::Html)
                    .await?
            }
        };
        Ok(MessageHandle {
            channel_id,
            message_id: sent.id.0,
        })
    }

    async fn fetch_message(&self, handle: MessageHandle) -> Result<MessageHandle> {
        // The Bot API edits by chat and message ID; nothing to fetch.
        Ok(handle)
    }

    async fn edit_message(&self, message: MessageHandle, content: MessageContent) -> Result<()> {
        let chat = ChatId(message.channel_id);
        let id = MessageId(message.message_id);
        let result = match content {
            MessageContent::Plain(text) => self.bot.edit_message_text(chat, id, text).await,
            MessageContent::Rich(rich) => {
                self.bot
                    .edit_message_text(chat, id, rich_to_html(&rich))
                    .parse_mode(ParseMode::Html)
                    .await
            }
        };
        settle_edit(result)
    }

    async fn lookup_user(&self, channel_id: i64, user_id: &str) -> Result<UserProfile> {
        let member = self.chat_member(channel_id, user_id).await?;
        let user = member.user;
        let username = user.username.clone().unwrap_or_else(|| user.full_name());
        Ok(UserProfile {
            id: user.id.0.to_string(),
            username,
        })
    }

    async fn caller_roles(&self, channel_id: i64, user_id: &str) -> Result<HashSet<String>> {
        let member = self.chat_member(channel_id, user_id).await?;
        Ok(member_roles(&member))
    }
}
