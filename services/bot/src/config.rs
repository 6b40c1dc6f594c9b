//! services/bot/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub bot_token: String,
    pub openai_api_key: Option<String>,
    pub quiz_model: String,
    /// Channel the bot answers in. `None` (unset or `0`) means unrestricted;
    /// otherwise commands from any other channel are refused.
    pub allowed_channel_id: Option<u64>,
    /// Overrides the default quiz-generation system prompt when set.
    pub system_prompt: Option<String>,
    /// Where the uploaded document is staged; one file, overwritten per upload.
    pub staging_path: PathBuf,
    pub reaper_interval: Duration,
    pub idle_timeout: Duration,
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

        // --- Load Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Credentials ---
        let bot_token = std::env::var("BOT_TOKEN")
            .map_err(|_| ConfigError::MissingVar("BOT_TOKEN".to_string()))?;
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        // --- Load Quiz Settings ---
        let quiz_model =
            std::env::var("QUIZ_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let allowed_channel_id = match std::env::var("ALLOWED_CHANNEL_ID") {
            Ok(raw) => {
                let id = raw.parse::<u64>().map_err(|_| {
                    ConfigError::InvalidValue(
                        "ALLOWED_CHANNEL_ID".to_string(),
                        format!("'{}' is not a channel id", raw),
                    )
                })?;
                if id == 0 {
                    None
                } else {
                    Some(id)
                }
            }
            Err(_) => None,
        };

        let system_prompt = std::env::var("QUIZ_SYSTEM_PROMPT").ok();

        let staging_path = std::env::var("STAGING_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./temp.pdf"));

        // --- Load Idle Reaper Settings ---
        let reaper_interval =
            Duration::from_secs(parse_secs("REAPER_INTERVAL_SECS", 5 * 60)?);
        let idle_timeout = Duration::from_secs(parse_secs("IDLE_TIMEOUT_SECS", 30 * 60)?);

        Ok(Self {
            bind_address,
            log_level,
            bot_token,
            openai_api_key,
            quiz_model,
            allowed_channel_id,
            system_prompt,
            staging_path,
            reaper_interval,
            idle_timeout,
        })
    }
}

fn parse_secs(var: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                var.to_string(),
                format!("'{}' is not a number of seconds", raw),
            )
        }),
        Err(_) => Ok(default),
    }
}
