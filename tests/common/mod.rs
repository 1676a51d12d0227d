//! Mock responder and encoders shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use qrcolor::bot::{Controller, Conversation, Menu, Responder};
use qrcolor::color::RgbColor;
use qrcolor::config::BotConfig;
use qrcolor::encoder::Encoder;
use qrcolor::encoder_errors::EncodeError;
use qrcolor::session::SessionStore;
use teloxide::types::{ChatId, MessageId, UserId};

/// One outbound delivery
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text {
        chat_id: ChatId,
        text: String,
        menu: Option<Menu>,
    },
    Edit {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        menu: Option<Menu>,
    },
    Image {
        chat_id: ChatId,
        bytes: Vec<u8>,
        file_name: String,
        caption: String,
    },
}

impl Sent {
    pub fn text(&self) -> &str {
        match self {
            Sent::Text { text, .. } | Sent::Edit { text, .. } => text,
            Sent::Image { caption, .. } => caption,
        }
    }

    pub fn menu(&self) -> Option<&Menu> {
        match self {
            Sent::Text { menu, .. } | Sent::Edit { menu, .. } => menu.as_ref(),
            Sent::Image { .. } => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Sent::Image { .. })
    }
}

/// Records every delivery; can be told to fail image uploads
#[derive(Default)]
pub struct RecordingResponder {
    sent: Mutex<Vec<Sent>>,
    fail_images: Mutex<bool>,
    fail_all: Mutex<bool>,
}

impl RecordingResponder {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    pub fn fail_images(&self) {
        *self.fail_images.lock().unwrap() = true;
    }

    pub fn fail_everything(&self) {
        *self.fail_all.lock().unwrap() = true;
    }

    fn record(&self, sent: Sent) -> Result<()> {
        if *self.fail_all.lock().unwrap() {
            return Err(anyhow!("transport down"));
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

#[async_trait]
impl Responder for RecordingResponder {
    async fn send_text(&self, chat_id: ChatId, text: String, menu: Option<Menu>) -> Result<()> {
        self.record(Sent::Text {
            chat_id,
            text,
            menu,
        })
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        menu: Option<Menu>,
    ) -> Result<()> {
        self.record(Sent::Edit {
            chat_id,
            message_id,
            text,
            menu,
        })
    }

    async fn send_image(
        &self,
        chat_id: ChatId,
        bytes: Vec<u8>,
        file_name: String,
        caption: String,
    ) -> Result<()> {
        if *self.fail_images.lock().unwrap() {
            return Err(anyhow!("upload rejected"));
        }
        self.record(Sent::Image {
            chat_id,
            bytes,
            file_name,
            caption,
        })
    }
}

/// Returns fixed bytes and remembers what it was asked to encode
#[derive(Default)]
pub struct StubEncoder {
    pub calls: Mutex<Vec<(String, RgbColor)>>,
    pub fail: bool,
    pub delay: Option<Duration>,
}

impl StubEncoder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, RgbColor)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Encoder for StubEncoder {
    fn encode(&self, text: &str, color: RgbColor) -> Result<Vec<u8>, EncodeError> {
        self.calls.lock().unwrap().push((text.to_string(), color));
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.fail {
            return Err(EncodeError::Render("stub failure".to_string()));
        }
        Ok(b"\x89PNG stub".to_vec())
    }
}

pub const CHAT: ChatId = ChatId(42);
pub const USER: UserId = UserId(4242);
pub const MENU_MESSAGE: MessageId = MessageId(7);

/// Conversation for a typed message
pub fn typed() -> Conversation {
    Conversation {
        user_id: USER,
        chat_id: CHAT,
        origin: None,
        first_name: Some("Ada".to_string()),
    }
}

/// Conversation for a menu press on `MENU_MESSAGE`
pub fn pressed() -> Conversation {
    Conversation {
        origin: Some(MENU_MESSAGE),
        ..typed()
    }
}

pub struct Harness {
    pub controller: Controller,
    pub responder: Arc<RecordingResponder>,
    pub encoder: Arc<StubEncoder>,
}

pub fn harness_with(encoder: StubEncoder, config: BotConfig) -> Harness {
    let responder = Arc::new(RecordingResponder::default());
    let encoder = Arc::new(encoder);
    let controller = Controller::new(
        config.clone(),
        Arc::new(SessionStore::new(config.session.clone())),
        encoder.clone(),
        responder.clone(),
    );
    Harness {
        controller,
        responder,
        encoder,
    }
}

pub fn harness() -> Harness {
    harness_with(StubEncoder::default(), BotConfig::default())
}
