//! Chat transport interface used by the queue session and dispatcher.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;

/// Reference to a message the bot has published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    pub channel_id: i64,
    pub message_id: i32,
}

/// Author line of a rich message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub link: Option<String>,
}

/// Titled message with optional author and footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichMessage {
    pub title: String,
    pub author: Option<Author>,
    pub description: String,
    /// Extra labelled lines below the description
    pub fields: Vec<(String, String)>,
    pub footer: Option<String>,
}

/// Message body handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Plain(String),
    Rich(RichMessage),
}

impl MessageContent {
    pub fn plain(text: impl Into<String>) -> Self {
        MessageContent::Plain(text.into())
    }
}

/// A user as resolved by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
}

/// Platform operations the bot needs.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Transport name (for logs).
    fn name(&self) -> &str;

    /// Send a new message to a channel.
    async fn publish_message(&self, channel_id: i64, content: MessageContent)
        -> Result<MessageHandle>;

    /// Resolve a previously published message into an editable reference.
    async fn fetch_message(&self, handle: MessageHandle) -> Result<MessageHandle>;

    /// Replace the content of a published message.
    async fn edit_message(&self, message: MessageHandle, content: MessageContent) -> Result<()>;

    /// Look up a user by platform ID.
    async fn lookup_user(&self, channel_id: i64, user_id: &str) -> Result<UserProfile>;

    /// Role names the user holds in the channel.
    async fn caller_roles(&self, channel_id: i64, user_id: &str) -> Result<HashSet<String>>;
}
