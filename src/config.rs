//! # Configuration Module
//!
//! This module defines configuration structures for the bot: QR rendering
//! parameters, recovery settings around the encoder, and session lifecycle
//! limits. Everything has a `Default`; `BotConfig::from_env` overrides the
//! defaults from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use qrcode::EcLevel;

// Constants for QR rendering
pub const DEFAULT_BOX_SIZE: u32 = 10;
pub const DEFAULT_BORDER: u32 = 4;
pub const MAX_TEXT_LENGTH: usize = 500;
pub const INPUT_PREVIEW_CHARS: usize = 50;
pub const CAPTION_PREVIEW_CHARS: usize = 100;

/// QR rendering parameters
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Pixels per QR module
    pub box_size: u32,
    /// Quiet zone width in modules
    pub border: u32,
    /// Error correction level. `MAX_TEXT_LENGTH` characters always fit at
    /// L and M; at Q and H long multi-byte text may not.
    pub ec_level: EcLevel,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            box_size: DEFAULT_BOX_SIZE,
            border: DEFAULT_BORDER,
            ec_level: EcLevel::L,
        }
    }
}

/// Recovery configuration for encoder failures
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Upper bound for a single encode call
    pub operation_timeout: Duration,
    /// Circuit breaker failure threshold
    pub circuit_breaker_threshold: u32,
    /// How long the circuit stays open once tripped
    pub circuit_breaker_reset: Duration,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(10),
            circuit_breaker_threshold: 5,
            circuit_breaker_reset: Duration::from_secs(60), // 1 minute
        }
    }
}

/// Session lifecycle limits
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sessions untouched for longer than this are evicted
    pub idle_ttl: Duration,
    /// Hard cap on tracked sessions
    pub max_sessions: usize,
    /// Period of the background sweeper
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(60 * 60),
            max_sessions: 10_000,
            sweep_interval: Duration::from_secs(5 * 60),
        }
    }
}

/// Top-level configuration for the bot process
#[derive(Debug, Clone, Default)]
pub struct BotConfig {
    pub encoder: EncoderConfig,
    pub recovery: RecoveryConfig,
    pub session: SessionConfig,
}

impl BotConfig {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset. Malformed values are an error.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let encoder = EncoderConfig {
            box_size: env_or("QR_BOX_SIZE", defaults.encoder.box_size)?,
            border: env_or("QR_BORDER", defaults.encoder.border)?,
            ec_level: match env::var("QR_ERROR_CORRECTION") {
                Ok(raw) => parse_ec_level(&raw)?,
                Err(_) => defaults.encoder.ec_level,
            },
        };

        let recovery = RecoveryConfig {
            operation_timeout: secs_or(
                "QR_ENCODE_TIMEOUT_SECS",
                defaults.recovery.operation_timeout,
            )?,
            circuit_breaker_threshold: env_or(
                "QR_CIRCUIT_BREAKER_THRESHOLD",
                defaults.recovery.circuit_breaker_threshold,
            )?,
            circuit_breaker_reset: secs_or(
                "QR_CIRCUIT_BREAKER_RESET_SECS",
                defaults.recovery.circuit_breaker_reset,
            )?,
        };

        let session = SessionConfig {
            idle_ttl: secs_or("SESSION_IDLE_TTL_SECS", defaults.session.idle_ttl)?,
            max_sessions: env_or("SESSION_MAX_ENTRIES", defaults.session.max_sessions)?,
            sweep_interval: secs_or(
                "SESSION_SWEEP_INTERVAL_SECS",
                defaults.session.sweep_interval,
            )?,
        };

        let config = Self {
            encoder,
            recovery,
            session,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the bot cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.encoder.box_size == 0 {
            return Err(anyhow!("QR_BOX_SIZE must be at least 1"));
        }
        if self.session.max_sessions == 0 {
            return Err(anyhow!("SESSION_MAX_ENTRIES must be at least 1"));
        }
        if self.session.sweep_interval.is_zero() {
            return Err(anyhow!("SESSION_SWEEP_INTERVAL_SECS must be at least 1"));
        }
        Ok(())
    }
}

/// Parse an error-correction level name (`L`, `M`, `Q`, `H`), case-insensitive
pub fn parse_ec_level(raw: &str) -> Result<EcLevel> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "L" => Ok(EcLevel::L),
        "M" => Ok(EcLevel::M),
        "Q" => Ok(EcLevel::Q),
        "H" => Ok(EcLevel::H),
        other => Err(anyhow!(
            "invalid QR_ERROR_CORRECTION '{other}', expected one of L, M, Q, H"
        )),
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn secs_or(key: &str, default: Duration) -> Result<Duration> {
    env_or(key, default.as_secs()).map(Duration::from_secs)
}
