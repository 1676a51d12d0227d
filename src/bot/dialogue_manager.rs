//! Dialogue Manager module: the per-user conversation controller.
//!
//! Every handler returns `anyhow::Result`; `Controller::dispatch` is the
//! outermost boundary that turns any error into a logged apology.

use std::sync::Arc;

use anyhow::{Error, Result};
use teloxide::types::{ChatId, UserId};
use tracing::{debug, error, info, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::color::ColorChoice;
use crate::config::{BotConfig, MAX_TEXT_LENGTH};
use crate::dialogue::{validate_qr_text, EncodeRequest, TextValidationError};
use crate::encoder::{encode_with_recovery, Encoder};
use crate::localization::{t, t_args};
use crate::session::SessionStore;

use super::events::{Conversation, Event, MenuAction};
use super::responder::Responder;
use super::ui_builder::{
    color_menu, follow_up_menu, format_caption, format_color_prompt, format_help, format_welcome,
    main_menu, qr_file_name, Menu,
};

/// Drives the text → color → QR code conversation
pub struct Controller {
    sessions: Arc<SessionStore>,
    encoder: Arc<dyn Encoder>,
    responder: Arc<dyn Responder>,
    circuit_breaker: CircuitBreaker,
    config: BotConfig,
}

impl Controller {
    pub fn new(
        config: BotConfig,
        sessions: Arc<SessionStore>,
        encoder: Arc<dyn Encoder>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        Self {
            sessions,
            encoder,
            responder,
            circuit_breaker: CircuitBreaker::new(config.recovery.clone()),
            config,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one inbound event. Never fails: errors end in an apology.
    pub async fn dispatch(&self, conversation: Conversation, event: Event) {
        if let Err(e) = self.handle(&conversation, event).await {
            self.on_unhandled_error(&conversation, &e).await;
        }
    }

    async fn handle(&self, conversation: &Conversation, event: Event) -> Result<()> {
        match event {
            Event::Start => self.on_command_start(conversation).await,
            Event::Help => self.on_command_help(conversation).await,
            Event::About => self.on_command_about(conversation).await,
            Event::Text(text) => self.on_text_submitted(conversation, &text).await,
            Event::Menu(action) => self.on_menu_action(conversation, action).await,
        }
    }

    pub async fn on_command_start(&self, conversation: &Conversation) -> Result<()> {
        debug!(user_id = %conversation.user_id, "Sending welcome message");
        self.responder
            .send_text(
                conversation.chat_id,
                format_welcome(conversation.first_name.as_deref()),
                Some(main_menu()),
            )
            .await
    }

    pub async fn on_command_help(&self, conversation: &Conversation) -> Result<()> {
        self.responder
            .send_text(conversation.chat_id, format_help(), None)
            .await
    }

    pub async fn on_command_about(&self, conversation: &Conversation) -> Result<()> {
        self.responder
            .send_text(conversation.chat_id, t("about"), None)
            .await
    }

    pub async fn on_text_submitted(&self, conversation: &Conversation, text: &str) -> Result<()> {
        let user_id = conversation.user_id;

        match validate_qr_text(text) {
            Ok(text) => {
                let mut session = self.sessions.acquire(user_id).await;
                if session.pending().is_some() {
                    debug!(user_id = %user_id, "Replacing previously pending text");
                }
                session.set_pending(text.to_string());
                info!(user_id = %user_id, text_length = text.chars().count(), "Text stored, awaiting color");

                self.responder
                    .send_text(
                        conversation.chat_id,
                        format_color_prompt(text),
                        Some(color_menu()),
                    )
                    .await
            }
            Err(TextValidationError::TooLong { length }) => {
                info!(user_id = %user_id, text_length = length, "Rejected text over the length limit");
                self.responder
                    .send_text(
                        conversation.chat_id,
                        t_args(
                            "error-text-too-long",
                            &[("max", &MAX_TEXT_LENGTH.to_string())],
                        ),
                        None,
                    )
                    .await
            }
            Err(TextValidationError::Empty) => {
                self.responder
                    .send_text(conversation.chat_id, t("error-text-empty"), None)
                    .await
            }
        }
    }

    pub async fn on_color_selected(
        &self,
        conversation: &Conversation,
        color: ColorChoice,
    ) -> Result<()> {
        let user_id = conversation.user_id;

        // Held until the image is delivered so a concurrent submission from
        // the same user waits for this one.
        let mut session = self.sessions.acquire(user_id).await;
        let Some(text) = session.take_pending() else {
            info!(user_id = %user_id, color = %color, "Color selected with no pending text");
            return self
                .reply(conversation, t("error-no-pending-text"), None)
                .await;
        };

        let request = match EncodeRequest::new(text, color) {
            Ok(request) => request,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Pending text failed validation");
                return self
                    .reply(conversation, t("error-encode-failed"), None)
                    .await;
            }
        };

        self.reply(conversation, t("processing"), None).await?;

        match encode_with_recovery(
            Arc::clone(&self.encoder),
            request.text.clone(),
            request.color.rgb(),
            &self.config.recovery,
            &self.circuit_breaker,
        )
        .await
        {
            Ok(image) => {
                self.responder
                    .send_image(
                        conversation.chat_id,
                        image,
                        qr_file_name(request.color),
                        format_caption(&request.text, request.color),
                    )
                    .await?;
                info!(user_id = %user_id, color = %request.color, "QR code delivered");

                self.reply(conversation, t("qr-follow-up"), Some(follow_up_menu()))
                    .await
            }
            Err(e) => {
                error!(user_id = %user_id, color = %request.color, error = %e, "Error generating QR code");
                self.reply(conversation, t("error-encode-failed"), None)
                    .await
            }
        }
    }

    pub async fn on_menu_action(&self, conversation: &Conversation, action: MenuAction) -> Result<()> {
        debug!(user_id = %conversation.user_id, action = ?action, "Menu action");
        match action {
            MenuAction::Generate => {
                self.reply(conversation, t("generate-prompt"), None).await
            }
            MenuAction::Help => self.on_command_help(conversation).await,
            MenuAction::MainMenu => self.on_command_start(conversation).await,
            MenuAction::Color(color) => self.on_color_selected(conversation, color).await,
        }
    }

    /// Log the error and apologise. A failure to deliver the apology is
    /// logged and dropped.
    pub async fn on_unhandled_error(&self, conversation: &Conversation, error: &Error) {
        error!(
            user_id = %conversation.user_id,
            chat_id = %conversation.chat_id,
            error = ?error,
            "Unhandled error while processing update"
        );
        self.notify_failure(conversation.user_id, conversation.chat_id)
            .await;
    }

    async fn notify_failure(&self, user_id: UserId, chat_id: ChatId) {
        if let Err(e) = self
            .responder
            .send_text(chat_id, t("error-generic"), None)
            .await
        {
            warn!(user_id = %user_id, error = %e, "Failed to notify user about an error");
        }
    }

    /// Edit the menu message the event came from, or send a new message
    async fn reply(&self, conversation: &Conversation, text: String, menu: Option<Menu>) -> Result<()> {
        match conversation.origin {
            Some(message_id) => {
                self.responder
                    .edit_text(conversation.chat_id, message_id, text, menu)
                    .await
            }
            None => {
                self.responder
                    .send_text(conversation.chat_id, text, menu)
                    .await
            }
        }
    }
}
