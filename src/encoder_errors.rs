//! # Encoder Error Types Module
//!
//! Structured errors for QR encoding. None of these reach the user verbatim;
//! the controller logs them and shows a generic failure message.

/// Custom error types for encode operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The text cannot be represented as a QR code
    Validation(String),
    /// Rasterising or PNG encoding failed
    Render(String),
    /// The encoder did not finish in time
    Timeout(String),
    /// The circuit breaker is open
    Unavailable(String),
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::Validation(msg) => write!(f, "Validation error: {msg}"),
            EncodeError::Render(msg) => write!(f, "Render error: {msg}"),
            EncodeError::Timeout(msg) => write!(f, "Timeout error: {msg}"),
            EncodeError::Unavailable(msg) => write!(f, "Encoder unavailable: {msg}"),
        }
    }
}

impl std::error::Error for EncodeError {}

impl From<qrcode::types::QrError> for EncodeError {
    fn from(err: qrcode::types::QrError) -> Self {
        EncodeError::Validation(err.to_string())
    }
}

impl From<image::ImageError> for EncodeError {
    fn from(err: image::ImageError) -> Self {
        EncodeError::Render(err.to_string())
    }
}
