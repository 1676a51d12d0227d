//! QR encoding: the `Encoder` seam, the QR/PNG implementation, and the
//! timeout and circuit-breaker wrapper the controller calls through.

use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use qrcode::{Color, QrCode};
use tracing::{debug, info, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::color::RgbColor;
use crate::config::{EncoderConfig, RecoveryConfig};
use crate::encoder_errors::EncodeError;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Turns text plus a foreground color into image bytes
pub trait Encoder: Send + Sync {
    fn encode(&self, text: &str, color: RgbColor) -> Result<Vec<u8>, EncodeError>;
}

/// Renders a QR code as a PNG on a white background
#[derive(Debug, Clone, Default)]
pub struct QrEncoder {
    config: EncoderConfig,
}

impl QrEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Rasterise `text` into an RGB image without encoding it
    pub fn render(&self, text: &str, color: RgbColor) -> Result<RgbImage, EncodeError> {
        if text.is_empty() {
            return Err(EncodeError::Validation("empty text".to_string()));
        }

        let code = QrCode::with_error_correction_level(text.as_bytes(), self.config.ec_level)?;
        let modules = u32::try_from(code.width())
            .map_err(|_| EncodeError::Render("QR matrix too large".to_string()))?;
        let box_size = self.config.box_size;
        let offset = self.config.border * box_size;
        let side = (modules + 2 * self.config.border) * box_size;

        let foreground = Rgb([color.0, color.1, color.2]);
        let mut img = RgbImage::from_pixel(side, side, BACKGROUND);

        for (index, module) in code.to_colors().into_iter().enumerate() {
            if module != Color::Dark {
                continue;
            }
            // index < modules * modules, which already fit in u32
            let index = index as u32;
            let x0 = offset + (index % modules) * box_size;
            let y0 = offset + (index / modules) * box_size;
            for y in y0..y0 + box_size {
                for x in x0..x0 + box_size {
                    img.put_pixel(x, y, foreground);
                }
            }
        }

        debug!(modules, side, "Rendered QR matrix");
        Ok(img)
    }
}

impl Encoder for QrEncoder {
    fn encode(&self, text: &str, color: RgbColor) -> Result<Vec<u8>, EncodeError> {
        let img = self.render(text, color)?;

        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
        Ok(bytes)
    }
}

/// Run the encoder on the blocking pool, bounded by the configured timeout
/// and guarded by the circuit breaker.
pub async fn encode_with_recovery(
    encoder: Arc<dyn Encoder>,
    text: String,
    color: RgbColor,
    config: &RecoveryConfig,
    circuit_breaker: &CircuitBreaker,
) -> Result<Vec<u8>, EncodeError> {
    if circuit_breaker.is_open() {
        warn!("Circuit breaker is open, rejecting encode request");
        return Err(EncodeError::Unavailable(
            "too many recent encoder failures".to_string(),
        ));
    }
    if circuit_breaker.is_half_open() {
        debug!("Circuit breaker is half-open, letting a trial encode through");
    }

    let text_length = text.chars().count();
    let task = tokio::task::spawn_blocking(move || encoder.encode(&text, color));

    let result = match tokio::time::timeout(config.operation_timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(EncodeError::Render(format!(
            "encoder task failed: {join_error}"
        ))),
        Err(_) => Err(EncodeError::Timeout(format!(
            "encoding took longer than {:?}",
            config.operation_timeout
        ))),
    };

    match &result {
        Ok(bytes) => {
            circuit_breaker.record_success();
            info!(text_length, image_bytes = bytes.len(), "QR code encoded");
        }
        // Text that cannot fit a QR code says nothing about encoder health
        Err(e @ EncodeError::Validation(_)) => {
            info!(text_length, error = %e, "Text rejected by the encoder");
        }
        Err(e) => {
            circuit_breaker.record_failure();
            warn!(text_length, error = %e, "QR encoding failed");
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_dimensions_and_colors() {
        let encoder = QrEncoder::default();
        let img = encoder.render("Hello", RgbColor(255, 0, 0)).unwrap();

        // Version 1 is 21 modules wide, plus a 4 module border each side
        assert_eq!(img.width(), (21 + 8) * 10);
        assert_eq!(img.height(), img.width());

        // Quiet zone is white, the top-left finder pattern corner is dark
        assert_eq!(*img.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*img.get_pixel(40, 40), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_empty_text_rejected() {
        let encoder = QrEncoder::default();
        assert!(matches!(
            encoder.encode("", RgbColor(0, 0, 0)),
            Err(EncodeError::Validation(_))
        ));
    }
}
