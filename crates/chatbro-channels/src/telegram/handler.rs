//! Telegram message handler and bot runner

use super::adapter::{TelegramAdapter, EMPTY_MESSAGE_REPLY, RESET_REPLY};
use super::commands::BotCommand;
use crate::error::Result;
use chatbro_core::{CancellationToken, ChatService};
use std::sync::Arc;
use teloxide::{
    prelude::*,
    types::{BotCommand as MenuCommand, ChatAction, Message as TelegramMessage},
};
use tracing::{debug, error, info, instrument, warn};

impl TelegramAdapter {
    /// Poll for messages until `shutdown` is cancelled
    #[instrument(skip_all)]
    pub async fn run(self: Arc<Self>, chat: ChatService, shutdown: CancellationToken) -> Result<()> {
        info!("Starting Telegram bot");

        let reset = BotCommand::Reset;
        if let Err(e) = self
            .bot
            .set_my_commands(vec![MenuCommand::new("reset", reset.description())])
            .await
        {
            warn!(error = %e, "Failed to register bot commands");
        }

        let bot = self.bot.clone();
        let adapter = self.clone();
        let turn_cancel = shutdown.clone();
        let handler = Update::filter_message().endpoint(move |bot: Bot, msg: TelegramMessage| {
            let adapter = adapter.clone();
            let chat = chat.clone();
            let cancel = turn_cancel.clone();
            async move { adapter.handle_message(&chat, bot, msg, &cancel).await }
        });

        // Messages are handled concurrently, one task per update
        let mut dispatcher = Dispatcher::builder(bot, handler)
            .distribution_function(|_| None::<std::convert::Infallible>)
            .build();

        let shutdown_token = dispatcher.shutdown_token();
        tokio::spawn(async move {
            shutdown.cancelled().await;
            info!("Stopping Telegram bot");
            match shutdown_token.shutdown() {
                Ok(stopped) => stopped.await,
                Err(_) => debug!("Dispatcher was not running"),
            }
        });

        dispatcher.dispatch().await;
        info!("Telegram bot stopped");
        Ok(())
    }

    /// Handle an incoming message
    pub(crate) async fn handle_message(
        &self,
        chat: &ChatService,
        bot: Bot,
        msg: TelegramMessage,
        cancel: &CancellationToken,
    ) -> ResponseResult<()> {
        let chat_id = msg.chat.id;
        let sender = msg.from.as_ref().map_or(chat_id.0, |u| u.id.0 as i64);
        if !self.is_user_allowed(sender) {
            debug!(chat_id = %chat_id, user_id = sender, "User not in allowlist");
            return Ok(());
        }

        info!(chat_id = %chat_id, "Received message");
        let Some(text) = msg.text().map(str::trim).filter(|t| !t.is_empty()) else {
            warn!(chat_id = %chat_id, "Empty message, responded with stub");
            bot.send_message(chat_id, EMPTY_MESSAGE_REPLY).await?;
            return Ok(());
        };

        let user_key = chat_id.0.to_string();
        let reply = match BotCommand::parse(text) {
            Some(BotCommand::Reset) => {
                info!(chat_id = %chat_id, "Resetting chat history");
                chat.reset(&user_key, cancel)
                    .await
                    .map(|_| RESET_REPLY.to_string())
            }
            None => {
                let _ = bot.send_chat_action(chat_id, ChatAction::Typing).await;
                chat.respond(text, &user_key, cancel).await
            }
        };

        match reply {
            Ok(reply) => {
                let chunks = self.splitter.split(&reply);
                info!(chat_id = %chat_id, length = reply.len(), chunks = chunks.len(), "Sending response");
                for chunk in chunks {
                    bot.send_message(chat_id, chunk).await?;
                }
            }
            Err(e) => {
                error!(chat_id = %chat_id, error = %e, "Failed to process telegram message");
                bot.send_message(chat_id, Self::error_reply(&e)).await?;
            }
        }

        Ok(())
    }
}
