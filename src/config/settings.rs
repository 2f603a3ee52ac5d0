//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Environment variables consulted for the API credential, in order.
const CREDENTIAL_ENV_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generation API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash-image-preview".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

/// Where downloaded images are written
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_file_prefix() -> String {
    "image-creator".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            file_prefix: default_file_prefix(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Settings {
    /// Load settings from configuration files and environment variables
    ///
    /// `config/default.toml` is optional; built-in defaults apply without it.
    pub fn load() -> Result<Self> {
        Self::load_with("config/default.toml", false)
    }

    /// Load settings from a specific configuration file path, which must exist
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with(path, true)
    }

    fn load_with<P: AsRef<Path>>(path: P, required: bool) -> Result<Self> {
        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            .set_default("api.base_url", default_base_url())?
            .set_default("api.model", default_model())?
            .set_default("output.dir", default_output_dir())?
            .set_default("output.file_prefix", default_file_prefix())?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            // Load from configuration file
            .add_source(
                File::with_name(path.as_ref().to_str().unwrap_or("config/default"))
                    .required(required),
            )
            // Override with environment variables (prefixed with IMAGE_CREATOR__)
            .add_source(Environment::with_prefix("IMAGE_CREATOR").separator("__"))
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;
        if settings.api.key.trim().is_empty() {
            settings.api.key = credential_from_env().unwrap_or_default();
        }
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;

        if self.output.file_prefix.trim().is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "Output file prefix cannot be empty".to_string(),
            )));
        }

        if !["pretty", "json"].contains(&self.logging.format.as_str()) {
            return Err(AppError::Config(config::ConfigError::Message(format!(
                "Invalid log format '{}'. Must be 'pretty' or 'json'",
                self.logging.format
            ))));
        }

        Ok(())
    }
}

impl ApiConfig {
    /// Check that the credential and endpoint are usable
    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(AppError::MissingCredential(
                "API_KEY environment variable not set".to_string(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "API base URL cannot be empty".to_string(),
            )));
        }
        if self.model.trim().is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "Model identifier cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

fn credential_from_env() -> Option<String> {
    CREDENTIAL_ENV_VARS
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}
