//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `events`: Typed inbound events and callback-data codec
//! - `message_handler`: Handles incoming text messages and commands
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Creates menus and formats messages
//! - `responder`: Outbound delivery seam and its Telegram implementation
//! - `dialogue_manager`: The conversation controller

pub mod callback_handler;
pub mod dialogue_manager;
pub mod events;
pub mod message_handler;
pub mod responder;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

pub use dialogue_manager::Controller;
pub use events::{Command, Conversation, Event, MenuAction};
pub use responder::{Responder, TelegramResponder};
pub use ui_builder::{Menu, MenuButton};
