//! # QR Color Bot
//!
//! A Telegram bot that turns text into a QR code image in a color the user
//! picks from a menu.

pub mod bot;
pub mod circuit_breaker;
pub mod color;
pub mod config;
pub mod dialogue;
pub mod encoder;
pub mod encoder_errors;
pub mod localization;
pub mod session;
