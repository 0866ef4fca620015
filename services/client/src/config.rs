//! services/client/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

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
///
/// There is exactly one base URL per backend; every brochure-service
/// endpoint (generation, polling, static files) hangs off the same base.
#[derive(Clone, Debug)]
pub struct Config {
    /// Account backend: auth, user profile, brochure history.
    pub auth_base_url: String,
    /// Brochure service: generation, task polling, `/brochures/`, `/images/`.
    pub brochure_base_url: String,
    /// NLP prompt-parsing service.
    pub nlp_base_url: String,
    /// Where the persisted session (token + user record) lives.
    pub session_path: PathBuf,
    pub log_level: Level,
    /// Fixed delay between task-status polls.
    pub poll_interval: Duration,
    /// Upper bound on polls per job; exceeding it is a terminal timeout.
    pub poll_max_attempts: u32,
    /// Per-request timeout for every backend call.
    pub http_timeout: Duration,
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

        let auth_base_url = base_url_var("AUTH_BASE_URL", "http://localhost:8080")?;
        let brochure_base_url = base_url_var("BROCHURE_BASE_URL", "http://localhost:8006")?;
        let nlp_base_url = base_url_var("NLP_BASE_URL", "http://localhost:8010")?;

        let session_path = std::env::var("BROCHURA_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".brochura-session.json"));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let poll_interval = Duration::from_secs(u64_var("POLL_INTERVAL_SECS", 2)?);
        let poll_max_attempts = u64_var("POLL_MAX_ATTEMPTS", 60)? as u32;
        let http_timeout = Duration::from_secs(u64_var("HTTP_TIMEOUT_SECS", 30)?);

        Ok(Self {
            auth_base_url,
            brochure_base_url,
            nlp_base_url,
            session_path,
            log_level,
            poll_interval,
            poll_max_attempts,
            http_timeout,
        })
    }
}

/// Reads a base URL variable, trimming any trailing slash so joining with
/// `/path` segments stays predictable.
fn base_url_var(name: &str, default: &str) -> Result<String, ConfigError> {
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    if !raw.starts_with("http://") && !raw.starts_with("https://") {
        return Err(ConfigError::InvalidValue(
            name.to_string(),
            format!("'{}' is not an http(s) URL", raw),
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn u64_var(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls_lose_their_trailing_slash() {
        std::env::set_var("TEST_BASE_URL_A", "http://localhost:9000/");
        assert_eq!(
            base_url_var("TEST_BASE_URL_A", "http://unused").unwrap(),
            "http://localhost:9000"
        );
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        std::env::set_var("TEST_BASE_URL_B", "localhost:9000");
        assert!(base_url_var("TEST_BASE_URL_B", "http://unused").is_err());
    }
}
