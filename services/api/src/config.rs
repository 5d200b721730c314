//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// When absent, countdown anchors only live as long as the process.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub cors_origin: String,
    /// The academy's WhatsApp number in international format, digits only.
    pub whatsapp_number: String,
    pub countdown_namespace: String,
    pub countdown_cycle_ms: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        // --- Load Lead Handoff and Countdown Settings ---
        let whatsapp_number = parse_whatsapp_number(
            &std::env::var("WHATSAPP_NUMBER").unwrap_or_else(|_| "919999999999".to_string()),
        )?;
        let countdown_namespace = std::env::var("COUNTDOWN_NAMESPACE")
            .unwrap_or_else(|_| "examBannerResetTime".to_string());
        let countdown_cycle_ms = parse_cycle_hours(
            &std::env::var("COUNTDOWN_CYCLE_HOURS").unwrap_or_else(|_| "12".to_string()),
        )?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            whatsapp_number,
            countdown_namespace,
            countdown_cycle_ms,
        })
    }
}

/// Accepts `+91 99999 99999` style input and keeps only the digits.
fn parse_whatsapp_number(raw: &str) -> Result<String, ConfigError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(ConfigError::InvalidValue(
            "WHATSAPP_NUMBER".to_string(),
            format!("'{}' contains no digits", raw),
        ));
    }
    Ok(digits)
}

/// Converts a whole number of hours into milliseconds.
fn parse_cycle_hours(raw: &str) -> Result<u64, ConfigError> {
    let invalid = |reason: &str| {
        ConfigError::InvalidValue("COUNTDOWN_CYCLE_HOURS".to_string(), reason.to_string())
    };
    let hours = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| invalid(&e.to_string()))?;
    if hours == 0 {
        return Err(invalid("must be at least 1"));
    }
    hours
        .checked_mul(3_600_000)
        .ok_or_else(|| invalid("too large"))
}
