use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use studybot_core::{config::Config, messaging::port::MessagingPort, service::BotService};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BotService>,
    /// Our own `@username`, used to ignore commands addressed to other bots.
    pub bot_username: Option<String>,
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    let bot_username = match bot.get_me().await {
        Ok(me) => {
            tracing::info!("bot @{} is online", me.username());
            Some(me.username().to_string())
        }
        Err(e) => {
            tracing::warn!(error = %e, "get_me failed; continuing without bot username");
            None
        }
    };
    if let Some(chat) = cfg.welcome_chat_id {
        tracing::info!(chat_id = chat, "welcome messages go to a fixed chat");
    }
    if cfg.enforce_admin_approvals {
        tracing::info!("approval commands are restricted to chat administrators");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let service = Arc::new(BotService::new(&cfg, messenger));

    let state = Arc::new(AppState {
        service,
        bot_username,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|_| async {})
        .build()
        .dispatch()
        .await;

    Ok(())
}
