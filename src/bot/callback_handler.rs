//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{debug, warn};

use super::dialogue_manager::Controller;
use super::events::{Conversation, Event, MenuAction};

/// Handle callback queries from inline keyboards
pub async fn callback_handler(bot: Bot, q: CallbackQuery, controller: Arc<Controller>) -> Result<()> {
    debug!(user_id = %q.from.id, "Received callback query from user");

    // Answer first so the client drops its loading state while we encode
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(user_id = %q.from.id, error = %e, "Failed to answer callback query");
    }

    let Some(msg) = &q.message else {
        debug!(user_id = %q.from.id, "Callback query without a message, ignoring");
        return Ok(());
    };

    let data = q.data.as_deref().unwrap_or("");
    let Some(action) = MenuAction::from_callback_data(data) else {
        warn!(user_id = %q.from.id, data, "Unknown callback data");
        return Ok(());
    };

    let conversation = Conversation {
        user_id: q.from.id,
        chat_id: msg.chat().id,
        origin: Some(msg.id()),
        first_name: Some(q.from.first_name.clone()),
    };
    controller.dispatch(conversation, Event::Menu(action)).await;

    Ok(())
}
