use std::sync::Arc;

use qrcolor::circuit_breaker::CircuitBreaker;
use qrcolor::color::{ColorChoice, RgbColor};
use qrcode::EcLevel;
use qrcolor::config::{EncoderConfig, RecoveryConfig};
use qrcolor::encoder::{encode_with_recovery, Encoder, QrEncoder};
use qrcolor::encoder_errors::EncodeError;

/// The PNG decodes back to the expected size and colors
#[test]
fn test_png_output_decodes() {
    let encoder = QrEncoder::default();
    let bytes = encoder
        .encode("https://example.com", ColorChoice::Blue.rgb())
        .unwrap();

    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

    let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(img.width(), img.height());
    assert_eq!((img.width() / 10 - 8 - 21) % 4, 0);
    assert_eq!(img.get_pixel(5, 5).0, [255, 255, 255]);
    assert_eq!(img.get_pixel(45, 45).0, [0, 0, 255]);
}

#[test]
fn test_custom_geometry() {
    let encoder = QrEncoder::new(EncoderConfig {
        box_size: 2,
        border: 1,
        ..Default::default()
    });
    let img = encoder.render("Hi", RgbColor(0, 0, 0)).unwrap();
    assert_eq!(img.width(), (21 + 2) * 2);
    assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255]);
    assert_eq!(img.get_pixel(2, 2).0, [0, 0, 0]);
}

/// 500 characters still fits in a QR code
#[test]
fn test_max_length_text_encodes() {
    let encoder = QrEncoder::default();
    let text = "W".repeat(500);
    assert!(encoder.encode(&text, RgbColor(0, 0, 0)).is_ok());
}

#[tokio::test]
async fn test_recovery_wrapper_success() {
    let breaker = CircuitBreaker::new(RecoveryConfig::default());
    let bytes = encode_with_recovery(
        Arc::new(QrEncoder::default()),
        "Hello".to_string(),
        ColorChoice::Red.rgb(),
        &RecoveryConfig::default(),
        &breaker,
    )
    .await
    .unwrap();

    assert!(!bytes.is_empty());
    assert_eq!(breaker.failure_count(), 0);
}

/// Always fails the way a broken renderer would
struct BrokenEncoder;

impl Encoder for BrokenEncoder {
    fn encode(&self, _text: &str, _color: RgbColor) -> Result<Vec<u8>, EncodeError> {
        Err(EncodeError::Render("renderer crashed".to_string()))
    }
}

#[tokio::test]
async fn test_recovery_wrapper_records_failures() {
    let config = RecoveryConfig {
        circuit_breaker_threshold: 1,
        ..Default::default()
    };
    let breaker = CircuitBreaker::new(config.clone());

    let first = encode_with_recovery(
        Arc::new(BrokenEncoder),
        "fine".to_string(),
        RgbColor(0, 0, 0),
        &config,
        &breaker,
    )
    .await;
    assert!(matches!(first, Err(EncodeError::Render(_))));

    let second = encode_with_recovery(
        Arc::new(QrEncoder::default()),
        "fine".to_string(),
        RgbColor(0, 0, 0),
        &config,
        &breaker,
    )
    .await;
    assert!(matches!(second, Err(EncodeError::Unavailable(_))));
}

/// Text too large for a QR code at level H is one user's problem, not an
/// encoder outage: other users keep getting codes.
#[tokio::test]
async fn test_oversized_text_does_not_trip_breaker() {
    let config = RecoveryConfig::default();
    let breaker = CircuitBreaker::new(config.clone());
    let encoder: Arc<dyn Encoder> = Arc::new(QrEncoder::new(EncoderConfig {
        ec_level: EcLevel::H,
        ..Default::default()
    }));

    let oversized = "🙂".repeat(500);
    assert!(qrcolor::dialogue::validate_qr_text(&oversized).is_ok());

    for _ in 0..config.circuit_breaker_threshold + 1 {
        let result = encode_with_recovery(
            Arc::clone(&encoder),
            oversized.clone(),
            RgbColor(0, 0, 0),
            &config,
            &breaker,
        )
        .await;
        assert!(matches!(result, Err(EncodeError::Validation(_))));
    }
    assert_eq!(breaker.failure_count(), 0);
    assert!(!breaker.is_open());

    let other_user = encode_with_recovery(
        encoder,
        "Hello".to_string(),
        RgbColor(0, 0, 0),
        &config,
        &breaker,
    )
    .await;
    assert!(other_user.is_ok());
}

/// Empty text is rejected without counting against the encoder
#[tokio::test]
async fn test_empty_text_leaves_breaker_closed() {
    let config = RecoveryConfig {
        circuit_breaker_threshold: 1,
        ..Default::default()
    };
    let breaker = CircuitBreaker::new(config.clone());

    let result = encode_with_recovery(
        Arc::new(QrEncoder::default()),
        String::new(),
        RgbColor(0, 0, 0),
        &config,
        &breaker,
    )
    .await;
    assert!(matches!(result, Err(EncodeError::Validation(_))));
    assert!(!breaker.is_open());
}

#[test]
fn test_error_message_formatting() {
    let timeout = EncodeError::Timeout("took too long".to_string());
    assert_eq!(timeout.to_string(), "Timeout error: took too long");

    let render = EncodeError::Render("bad".to_string());
    assert!(render.to_string().contains("Render error"));
}
