//! Telegram bot client - long polling into the queue dispatcher.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{BotCommand, Message};

use crate::bot::{CommandDispatcher, IncomingCommand};
use crate::config::Settings;
use crate::core::SystemClock;
use crate::error::Error;

use super::transport::TelegramTransport;

/// Convert a Telegram message into a dispatcher input.
fn incoming_from(msg: &Message) -> Option<IncomingCommand> {
    let text = msg.text()?;
    let user = msg.from.as_ref()?;

    Some(IncomingCommand {
        channel_id: msg.chat.id.0,
        author_id: user.id.0.to_string(),
        author_name: user.full_name(),
        author_mention: user.mention().unwrap_or_else(|| user.full_name()),
        from_bot: user.is_bot,
        text: text.to_string(),
    })
}

/// Run the queue bot until interrupted.
pub async fn run_queue_bot(settings: Settings) -> Result<(), Error> {
    tracing::info!("Starting Telegram queue bot...");

    let token = settings
        .bot_token
        .clone()
        .ok_or_else(|| Error::Config("No bot token configured".to_string()))?;

    let bot = Bot::new(token);

    if settings.prefix == "/" {
        if let Err(e) = bot
            .set_my_commands(vec![BotCommand::new(
                "queue",
                "start, join, leave, time, add, remove, help",
            )])
            .await
        {
            tracing::warn!("Failed to set commands: {}", e);
        }
    }

    let me = bot.get_me().await?;
    tracing::info!("Authenticated as {}", me.user.full_name());

    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let mut dispatcher = CommandDispatcher::new(&settings, transport, Arc::new(SystemClock));
    if let Some(username) = me.user.username.clone() {
        dispatcher = dispatcher.with_bot_username(username);
    }
    let dispatcher = Arc::new(dispatcher);

    tracing::info!("Queue bot is running (prefix '{}')", settings.prefix);

    teloxide::repl(bot, move |msg: Message| {
        let dispatcher = dispatcher.clone();
        async move {
            if let Some(incoming) = incoming_from(&msg) {
                if let Err(e) = dispatcher.handle(&incoming).await {
                    tracing::warn!("Failed to reply in chat {}: {}", msg.chat.id, e);
                }
            }
            respond(())
        }
    })
    .await;

    tracing::info!("Queue bot stopped");
    Ok(())
}
