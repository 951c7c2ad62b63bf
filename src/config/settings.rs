//! Client configuration settings
//!
//! Defines all configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use super::resolver::PRODUCTION_BASE_URL;

/// Upper bound on retries regardless of configuration
pub const MAX_RETRY_LIMIT: u32 = 10;

/// Main client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Retry configuration
    pub retry: RetrySettings,
    /// Credential store configuration
    pub credentials: CredentialConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Explicit base URL override
    pub base_url_override: Option<String>,
    /// Path to the platform manifest (app.json)
    pub app_config_path: Option<PathBuf>,
    /// Whether the development-server heuristic is consulted
    pub dev_mode: bool,
    /// Development server host, port suffix allowed
    pub dev_server_host: String,
    /// Development API port
    pub dev_server_port: u16,
    /// Compiled-in production fallback
    pub fallback_url: Option<String>,
    /// Per-attempt timeout in seconds
    pub timeout: u64,
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Retries beyond the first attempt
    pub max_retries: u32,
    /// Initial back-off in milliseconds
    pub initial_delay_ms: u64,
    /// Back-off ceiling in milliseconds
    pub max_delay_ms: u64,
    /// Jitter ratio, 0.0..=1.0
    pub jitter_ratio: f64,
}

/// Credential store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// JSON key-value file holding the bearer token
    pub token_store_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url_override: None,
                app_config_path: None,
                dev_mode: false,
                dev_server_host: "localhost".to_string(),
                dev_server_port: 3000,
                fallback_url: Some(PRODUCTION_BASE_URL.to_string()),
                timeout: 30,
            },
            retry: RetrySettings::default(),
            credentials: CredentialConfig {
                token_store_path: default_token_store_path(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
            },
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 10000,
            jitter_ratio: 0.3,
        }
    }
}

impl Settings {
    /// Create a new configuration instance from the environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let settings = Self {
            api: ApiConfig {
                base_url_override: get_env_non_empty("CRM_API_URL"),
                app_config_path: get_env_non_empty("CRM_APP_CONFIG").map(PathBuf::from),
                dev_mode: get_env_or_default("CRM_DEV_MODE", "false")
                    .to_lowercase()
                    .parse()
                    .context("Invalid CRM_DEV_MODE flag")?,
                dev_server_host: get_env_or_default("CRM_DEV_SERVER_HOST", "localhost"),
                dev_server_port: get_env_or_default("CRM_DEV_SERVER_PORT", "3000")
                    .parse()
                    .context("Invalid development server port")?,
                fallback_url: Some(PRODUCTION_BASE_URL.to_string()),
                timeout: get_env_or_default("CRM_REQUEST_TIMEOUT", "30")
                    .parse()
                    .context("Invalid request timeout")?,
            },
            retry: RetrySettings {
                max_retries: bounded_retries(
                    get_env_or_default("CRM_MAX_RETRIES", "3")
                        .parse()
                        .context("Invalid maximum retry count")?,
                ),
                initial_delay_ms: get_env_or_default("CRM_RETRY_INITIAL_DELAY_MS", "1000")
                    .parse()
                    .context("Invalid initial retry delay")?,
                max_delay_ms: get_env_or_default("CRM_RETRY_MAX_DELAY_MS", "10000")
                    .parse()
                    .context("Invalid maximum retry delay")?,
                jitter_ratio: get_env_or_default("CRM_RETRY_JITTER", "0.3")
                    .parse()
                    .context("Invalid retry jitter ratio")?,
            },
            credentials: CredentialConfig {
                token_store_path: get_env_non_empty("CRM_TOKEN_STORE")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_token_store_path),
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
        };

        // Validate configuration
        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.api.base_url_override {
            if !url.trim().starts_with("http") {
                anyhow::bail!("Invalid CRM_API_URL format, should start with 'http': {}", url);
            }
        }

        if self.api.timeout == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        if self.api.dev_server_port == 0 {
            anyhow::bail!("Development server port cannot be 0");
        }

        if self.retry.max_delay_ms == 0 {
            anyhow::bail!("Maximum retry delay cannot be 0");
        }

        if !(0.0..=1.0).contains(&self.retry.jitter_ratio) {
            anyhow::bail!(
                "Retry jitter ratio must be between 0 and 1, got {}",
                self.retry.jitter_ratio
            );
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        // Validate log format
        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }
}

/// Clamp a configured retry count: negative means no retry
pub fn bounded_retries(configured: i64) -> u32 {
    if configured <= 0 {
        return 0;
    }
    if configured > MAX_RETRY_LIMIT as i64 {
        warn!(
            "Configured retry count {} exceeds limit, using {}",
            configured, MAX_RETRY_LIMIT
        );
        return MAX_RETRY_LIMIT;
    }
    configured as u32
}

fn default_token_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crm-client")
        .join("credentials.json")
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get environment variable, treating blank values as unset
fn get_env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
