//! Telegram update handlers.
//!
//! Each handler is a small adapter that turns a teloxide `Message` into the
//! platform-neutral types of `studybot-core` and hands it to the `BotService`.
//! Handlers always return `Ok` so one failing update never stops the
//! dispatcher.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use crate::router::AppState;

mod commands;
mod members;

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if let Some(users) = msg.new_chat_members() {
        return members::handle_new_members(&msg, users, state).await;
    }

    // Documents carry their command in the caption.
    if msg.text().or(msg.caption()).is_some() {
        return commands::handle_command(bot, msg, state).await;
    }

    Ok(())
}
