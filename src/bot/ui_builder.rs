//! UI Builder module for creating menus and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::color::ColorChoice;
use crate::config::{CAPTION_PREVIEW_CHARS, INPUT_PREVIEW_CHARS, MAX_TEXT_LENGTH};
use crate::dialogue::preview;
use crate::localization::{t, t_args};

use super::events::MenuAction;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuButton {
    pub label: String,
    pub action: MenuAction,
}

impl MenuButton {
    pub fn new(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// A transport-neutral set of labeled choices, laid out in rows
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Menu {
    pub rows: Vec<Vec<MenuButton>>,
}

impl Menu {
    pub fn buttons(&self) -> impl Iterator<Item = &MenuButton> {
        self.rows.iter().flatten()
    }

    pub fn actions(&self) -> Vec<MenuAction> {
        self.buttons().map(|button| button.action).collect()
    }
}

impl From<&Menu> for InlineKeyboardMarkup {
    fn from(menu: &Menu) -> Self {
        InlineKeyboardMarkup::new(menu.rows.iter().map(|row| {
            row.iter()
                .map(|button| {
                    InlineKeyboardButton::callback(
                        button.label.clone(),
                        button.action.to_callback_data(),
                    )
                })
                .collect::<Vec<_>>()
        }))
    }
}

/// Generate / Help entry points shown with the greeting
pub fn main_menu() -> Menu {
    Menu {
        rows: vec![
            vec![MenuButton::new(t("menu-generate"), MenuAction::Generate)],
            vec![MenuButton::new(t("menu-help"), MenuAction::Help)],
        ],
    }
}

/// Six colors, two per row
pub fn color_menu() -> Menu {
    Menu {
        rows: ColorChoice::ALL
            .chunks(2)
            .map(|pair| {
                pair.iter()
                    .map(|color| {
                        let name = t(&format!("color-{}", color.token()));
                        let label = format!("{} {}", color.emoji(), name);
                        MenuButton::new(label, MenuAction::Color(*color))
                    })
                    .collect()
            })
            .collect(),
    }
}

/// Offered after a QR code is delivered
pub fn follow_up_menu() -> Menu {
    Menu {
        rows: vec![
            vec![MenuButton::new(t("menu-generate-again"), MenuAction::Generate)],
            vec![MenuButton::new(t("menu-main"), MenuAction::MainMenu)],
        ],
    }
}

pub fn format_welcome(first_name: Option<&str>) -> String {
    let anonymous = t("welcome-anonymous");
    let name = first_name.unwrap_or(&anonymous);
    t_args("welcome", &[("name", name)])
}

pub fn format_help() -> String {
    t_args("help", &[("max", &MAX_TEXT_LENGTH.to_string())])
}

pub fn format_color_prompt(text: &str) -> String {
    t_args(
        "color-prompt",
        &[("preview", &preview(text, INPUT_PREVIEW_CHARS))],
    )
}

pub fn format_caption(text: &str, color: ColorChoice) -> String {
    t_args(
        "qr-caption",
        &[
            ("preview", &preview(text, CAPTION_PREVIEW_CHARS)),
            ("color", color.display_name()),
        ],
    )
}

pub fn qr_file_name(color: ColorChoice) -> String {
    format!("qr_code_{}.png", color.token())
}
