//! QR dialogue module: conversation state, text validation and previews.

use std::fmt;

use crate::color::ColorChoice;
use crate::config::MAX_TEXT_LENGTH;

/// Represents the conversation state of a single user
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum QrDialogueState {
    #[default]
    Idle,
    AwaitingColor {
        text: String,
    },
}

impl QrDialogueState {
    pub fn from_pending(pending: Option<&str>) -> Self {
        match pending {
            Some(text) => QrDialogueState::AwaitingColor {
                text: text.to_string(),
            },
            None => QrDialogueState::Idle,
        }
    }
}

/// Rejection reasons for submitted text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextValidationError {
    Empty,
    TooLong { length: usize },
}

impl fmt::Display for TextValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextValidationError::Empty => write!(f, "text is empty"),
            TextValidationError::TooLong { length } => {
                write!(f, "text is {length} characters, limit is {MAX_TEXT_LENGTH}")
            }
        }
    }
}

impl std::error::Error for TextValidationError {}

/// Validates submitted text. Length is counted in characters, not bytes.
pub fn validate_qr_text(text: &str) -> Result<&str, TextValidationError> {
    if text.is_empty() {
        return Err(TextValidationError::Empty);
    }

    let length = text.chars().count();
    if length > MAX_TEXT_LENGTH {
        return Err(TextValidationError::TooLong { length });
    }

    Ok(text)
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Text and color, paired at the moment both are known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeRequest {
    pub text: String,
    pub color: ColorChoice,
}

impl EncodeRequest {
    pub fn new(text: String, color: ColorChoice) -> Result<Self, TextValidationError> {
        validate_qr_text(&text)?;
        Ok(Self { text, color })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_validation() {
        // Valid texts
        assert!(validate_qr_text("https://example.com").is_ok());
        assert!(validate_qr_text(&"a".repeat(500)).is_ok());

        // Invalid texts
        assert_eq!(validate_qr_text(""), Err(TextValidationError::Empty));
        assert_eq!(
            validate_qr_text(&"a".repeat(501)),
            Err(TextValidationError::TooLong { length: 501 })
        );
    }

    #[test]
    fn test_length_counts_characters() {
        // 500 two-byte characters is 1000 bytes but still within the limit
        assert!(validate_qr_text(&"é".repeat(500)).is_ok());
    }

    #[test]
    fn test_preview_truncation() {
        assert_eq!(preview("Hello", 50), "Hello");
        assert_eq!(preview(&"x".repeat(50), 50), "x".repeat(50));
        assert_eq!(preview(&"x".repeat(51), 50), format!("{}...", "x".repeat(50)));
        assert_eq!(preview("héllo wörld", 4), "héll...");
    }

    #[test]
    fn test_state_from_pending() {
        assert_eq!(QrDialogueState::from_pending(None), QrDialogueState::Idle);
        assert_eq!(
            QrDialogueState::from_pending(Some("hi")),
            QrDialogueState::AwaitingColor {
                text: "hi".to_string()
            }
        );
    }
}
