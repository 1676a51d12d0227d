//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::Me;
use tracing::debug;

use super::dialogue_manager::Controller;
use super::events::{decode_text, Conversation};

/// Build the conversation context for a message
pub fn conversation_from_message(msg: &Message) -> Option<Conversation> {
    let user = msg.from.as_ref()?;
    Some(Conversation {
        user_id: user.id,
        chat_id: msg.chat.id,
        origin: None,
        first_name: Some(user.first_name.clone()),
    })
}

pub async fn message_handler(msg: Message, me: Me, controller: Arc<Controller>) -> Result<()> {
    let Some(text) = msg.text() else {
        debug!(chat_id = %msg.chat.id, "Ignoring non-text message");
        return Ok(());
    };

    let Some(conversation) = conversation_from_message(&msg) else {
        debug!(chat_id = %msg.chat.id, "Ignoring message without a sender");
        return Ok(());
    };

    match decode_text(text, me.username()) {
        Some(event) => controller.dispatch(conversation, event).await,
        None => debug!(user_id = %conversation.user_id, "Ignoring unknown command"),
    }

    Ok(())
}
