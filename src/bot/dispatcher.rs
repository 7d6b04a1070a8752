//! Routes parsed queue commands to the session and replies to the caller.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::{DisplaySettings, Settings};
use crate::core::{Clock, QueueError, QueueSession};
use crate::error::Result;
use crate::transport::{ChatTransport, MessageContent};

use super::command::{parse, QueueCommand};

type QueueResult<T> = std::result::Result<T, QueueError>;

/// A chat message as seen by the dispatcher.
#[derive(Debug, Clone)]
pub struct IncomingCommand {
    pub channel_id: i64,
    pub author_id: String,
    /// Name used when the author joins the queue
    pub author_name: String,
    /// How to address the author in replies
    pub author_mention: String,
    pub from_bot: bool,
    pub text: String,
}

/// Owns the queue session and all transport I/O for queue commands.
///
/// Session operations run one at a time: the session lock is held from the
/// mutation through its publish.
pub struct CommandDispatcher {
    session: Mutex<QueueSession>,
    transport: Arc<dyn ChatTransport>,
    prefix: String,
    /// This bot's username, for `/queue@name` commands
    bot_username: Option<String>,
    display: DisplaySettings,
    use_rich_rendering: bool,
}

impl CommandDispatcher {
    pub fn new(
        settings: &Settings,
        transport: Arc<dyn ChatTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            session: Mutex::new(QueueSession::new(settings, clock)),
            transport,
            prefix: settings.prefix.clone(),
            bot_username: None,
            display: settings.display.clone(),
            use_rich_rendering: settings.use_rich_rendering,
        }
    }

    /// Accept commands addressed as `<prefix>queue@username`.
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    pub fn session(&self) -> &Mutex<QueueSession> {
        &self.session
    }

    /// Handle one chat message. Non-queue messages are ignored.
    pub async fn handle(&self, incoming: &IncomingCommand) -> Result<()> {
        if incoming.from_bot {
            return Ok(());
        }
        let Some(parsed) = parse(&incoming.text, &self.prefix, self.bot_username.as_deref()) else {
            return Ok(());
        };

        tracing::debug!(
            "Queue command from {} ({}): {:?}",
            incoming.author_name,
            incoming.author_id,
            parsed
        );

        let reply = match parsed {
            Ok(command) => self.execute(incoming, command).await,
            Err(e) => Some(self.error_reply(&e, incoming, &incoming.author_mention)),
        };

        if let Some(content) = reply {
            self.transport
                .publish_message(incoming.channel_id, content)
                .await?;
        }
        Ok(())
    }

    async fn execute(
        &self,
        incoming: &IncomingCommand,
        command: QueueCommand,
    ) -> Option<MessageContent> {
        let transport = self.transport.as_ref();
        let mention = incoming.author_mention.as_str();

        let result = match &command {
            QueueCommand::Start => {
                let mut session = self.session.lock().await;
                session
                    .start(transport, incoming.channel_id)
                    .await
                    .map(|_| None)
            }
            QueueCommand::Join => {
                let mut session = self.session.lock().await;
                session
                    .join(transport, &incoming.author_name, &incoming.author_id)
                    .await
                    .map(|_| None)
            }
            QueueCommand::Leave => {
                let mut session = self.session.lock().await;
                session
                    .leave(transport, &incoming.author_id)
                    .await
                    .map(|_| None)
            }
            QueueCommand::Add(target) => self.admin_add(incoming, target).await,
            QueueCommand::Remove(target) => {
                self.admin_remove(incoming, target).await.map(|_| None)
            }
            QueueCommand::Time(unit) => {
                let session = self.session.lock().await;
                session.query_time(&incoming.author_id, *unit).map(|elapsed| {
                    Some(MessageContent::plain(format!(
                        "{} has been in the queue for {}.",
                        mention, elapsed
                    )))
                })
            }
            QueueCommand::Up => {
                let mut session = self.session.lock().await;
                session.move_up(&incoming.author_id).map(|_| None)
            }
            QueueCommand::Down => {
                let mut session = self.session.lock().await;
                session.move_down(&incoming.author_id).map(|_| None)
            }
            QueueCommand::Help => Ok(Some(
                self.display
                    .help_message(&self.prefix, self.use_rich_rendering),
            )),
            QueueCommand::Missing => Ok(Some(MessageContent::plain(format!(
                "No commands provided, {}! {}",
                mention,
                self.help_hint()
            )))),
            QueueCommand::Unknown(sub) => Ok(Some(MessageContent::plain(format!(
                "Unknown queue command '{}'. {}",
                sub,
                self.help_hint()
            )))),
        };

        match result {
            Ok(reply) => reply,
            Err(e) => {
                let subject = match &command {
                    QueueCommand::Add(target) | QueueCommand::Remove(target) => target.as_str(),
                    _ => mention,
                };
                Some(self.error_reply(&e, incoming, subject))
            }
        }
    }

    /// Resolve and add `target`. A duplicate is answered here, named by the
    /// resolved username rather than the raw ID.
    async fn admin_add(
        &self,
        incoming: &IncomingCommand,
        target: &str,
    ) -> QueueResult<Option<MessageContent>> {
        let roles = self.caller_roles(incoming).await?;
        let mut session = self.session.lock().await;
        // Refuse before touching the user lookup
        session.authorize(&roles)?;

        let user = self
            .transport
            .lookup_user(incoming.channel_id, target)
            .await
            .map_err(|e| {
                tracing::debug!("User lookup for {} failed: {}", target, e);
                QueueError::UnknownUser(target.to_string())
            })?;

        tracing::info!("{} adds {} to the queue", incoming.author_name, user.username);
        match session
            .admin_add(self.transport.as_ref(), &roles, &user.username, &user.id)
            .await
        {
            Err(QueueError::DuplicateMember) => Ok(Some(self.error_reply(
                &QueueError::DuplicateMember,
                incoming,
                &user.username,
            ))),
            other => other.map(|_| None),
        }
    }

    async fn admin_remove(&self, incoming: &IncomingCommand, target: &str) -> QueueResult<()> {
        let roles = self.caller_roles(incoming).await?;
        let mut session = self.session.lock().await;
        tracing::info!("{} removes {} from the queue", incoming.author_name, target);
        session
            .admin_remove(self.transport.as_ref(), &roles, target)
            .await
    }

    async fn caller_roles(&self, incoming: &IncomingCommand) -> QueueResult<HashSet<String>> {
        self.transport
            .caller_roles(incoming.channel_id, &incoming.author_id)
            .await
            .map_err(|e| {
                tracing::warn!("Failed to read roles of {}: {}", incoming.author_id, e);
                QueueError::transport(e)
            })
    }

    fn help_hint(&self) -> String {
        format!(
            "Type {}queue help for a list of queue commands and their usage.",
            self.prefix
        )
    }

    fn error_reply(
        &self,
        error: &QueueError,
        incoming: &IncomingCommand,
        subject: &str,
    ) -> MessageContent {
        let text = match error {
            QueueError::AlreadyOpen => "A queue already exists.".to_string(),
            QueueError::QueueNotOpen => "A queue does not currently exist.".to_string(),
            QueueError::DuplicateMember => format!("{} already exists in the queue", subject),
            QueueError::NotQueued => format!("{} is not in the queue.", subject),
            QueueError::NotAuthorized => format!(
                "{}, you need an admin role to do that.",
                incoming.author_mention
            ),
            QueueError::MalformedArgs { usage } => format!("Usage: {}", usage),
            QueueError::NotImplemented(op) => format!("{} is not supported yet.", op),
            QueueError::UnknownUser(id) => format!("Could not find user {}.", id),
            QueueError::Transport(_) => "Could not update the queue message; \
                 it will catch up on the next change."
                .to_string(),
        };
        MessageContent::Plain(text)
    }
}
