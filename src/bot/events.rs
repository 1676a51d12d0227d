//! Typed inbound events, decoded once at the transport boundary.

use teloxide::types::{ChatId, MessageId, UserId};
use teloxide::utils::command::BotCommands;

use crate::color::ColorChoice;

const COLOR_PREFIX: &str = "color_";

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "start the bot")]
    Start,
    #[command(description = "show help")]
    Help,
    #[command(description = "about this bot")]
    About,
}

/// Inline menu actions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Generate,
    Help,
    MainMenu,
    Color(ColorChoice),
}

impl MenuAction {
    pub fn to_callback_data(self) -> String {
        match self {
            MenuAction::Generate => "generate".to_string(),
            MenuAction::Help => "help".to_string(),
            MenuAction::MainMenu => "menu".to_string(),
            MenuAction::Color(color) => format!("{COLOR_PREFIX}{}", color.token()),
        }
    }

    /// `None` for data no menu of ours produces. Unknown colors map to black.
    pub fn from_callback_data(data: &str) -> Option<Self> {
        if let Some(token) = data.strip_prefix(COLOR_PREFIX) {
            return Some(MenuAction::Color(ColorChoice::from_token(token)));
        }
        match data {
            "generate" => Some(MenuAction::Generate),
            "help" => Some(MenuAction::Help),
            "menu" => Some(MenuAction::MainMenu),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Start,
    Help,
    About,
    Text(String),
    Menu(MenuAction),
}

impl From<Command> for Event {
    fn from(command: Command) -> Self {
        match command {
            Command::Start => Event::Start,
            Command::Help => Event::Help,
            Command::About => Event::About,
        }
    }
}

/// Who an event came from and where replies go
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversation {
    pub user_id: UserId,
    pub chat_id: ChatId,
    /// Message carrying the menu that was pressed, if any
    pub origin: Option<MessageId>,
    pub first_name: Option<String>,
}

/// Decode the text of a message. Command names match case-insensitively;
/// unknown slash commands decode to `None`.
pub fn decode_text(text: &str, bot_username: &str) -> Option<Event> {
    match Command::parse(&lowercase_command(text), bot_username) {
        Ok(command) => Some(command.into()),
        Err(_) if text.starts_with('/') => None,
        Err(_) => Some(Event::Text(text.to_string())),
    }
}

/// `/Start@QrBot now` becomes `/start@QrBot now`; anything else is unchanged
fn lowercase_command(text: &str) -> String {
    if !text.starts_with('/') {
        return text.to_string();
    }
    let name_end = text
        .find(|c: char| c == '@' || c.is_whitespace())
        .unwrap_or(text.len());
    let (name, rest) = text.split_at(name_end);
    format!("{}{rest}", name.to_lowercase())
}
