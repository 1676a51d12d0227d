//! Outbound responder: the seam between the controller and the chat
//! transport.

use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, InputFile, MessageId};

use super::ui_builder::Menu;

/// Delivers replies to a chat
#[async_trait]
pub trait Responder: Send + Sync {
    /// Send a new text message, optionally with a menu
    async fn send_text(&self, chat_id: ChatId, text: String, menu: Option<Menu>) -> Result<()>;

    /// Replace the text (and menu) of a message previously sent by the bot
    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        menu: Option<Menu>,
    ) -> Result<()>;

    /// Send an image with a caption
    async fn send_image(
        &self,
        chat_id: ChatId,
        image: Vec<u8>,
        file_name: String,
        caption: String,
    ) -> Result<()>;
}

/// Telegram implementation backed by a teloxide `Bot`
#[derive(Clone)]
pub struct TelegramResponder {
    bot: Bot,
}

impl TelegramResponder {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Responder for TelegramResponder {
    async fn send_text(&self, chat_id: ChatId, text: String, menu: Option<Menu>) -> Result<()> {
        let request = self.bot.send_message(chat_id, text);
        match menu {
            Some(menu) => request.reply_markup(InlineKeyboardMarkup::from(&menu)).await?,
            None => request.await?,
        };
        Ok(())
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        menu: Option<Menu>,
    ) -> Result<()> {
        let request = self.bot.edit_message_text(chat_id, message_id, text);
        match menu {
            Some(menu) => request.reply_markup(InlineKeyboardMarkup::from(&menu)).await?,
            None => request.await?,
        };
        Ok(())
    }

    async fn send_image(
        &self,
        chat_id: ChatId,
        image: Vec<u8>,
        file_name: String,
        caption: String,
    ) -> Result<()> {
        self.bot
            .send_photo(chat_id, InputFile::memory(image).file_name(file_name))
            .caption(caption)
            .await?;
        Ok(())
    }
}
