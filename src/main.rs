use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use qrcolor::bot::{self, Command, Controller, TelegramResponder};
use qrcolor::config::BotConfig;
use qrcolor::encoder::QrEncoder;
use qrcolor::session::SessionStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();
    info!("Starting QR Color Telegram Bot");

    let bot_token = env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN must be set")?;
    let config = BotConfig::from_env().context("Invalid bot configuration")?;
    debug!(config = ?config, "Configuration loaded");

    let bot = Bot::new(bot_token);
    let me = bot.get_me().await.context("Failed to fetch bot identity")?;
    info!(username = %me.username(), "Bot identity fetched");

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    let sessions = Arc::new(SessionStore::new(config.session.clone()));
    spawn_session_sweeper(Arc::clone(&sessions), config.session.sweep_interval);

    let controller = Arc::new(Controller::new(
        config.clone(),
        sessions,
        Arc::new(QrEncoder::new(config.encoder.clone())),
        Arc::new(TelegramResponder::new(bot.clone())),
    ));

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(bot::message_handler))
        .branch(Update::filter_callback_query().endpoint(bot::callback_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![me, controller])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Periodically drop sessions that have been idle past their TTL
fn spawn_session_sweeper(sessions: Arc<SessionStore>, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let evicted = sessions.evict_idle();
            if evicted > 0 {
                info!(evicted, remaining = sessions.len(), "Session sweep completed");
            }
        }
    });
}
