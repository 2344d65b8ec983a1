//! Configuration management.
//!
//! A [`Config`] is built once at startup and handed to the client. The API
//! credential comes from the `INSEE_API_KEY` environment variable (a `.env`
//! file in the working directory is honoured); the remaining settings can be
//! provided through an optional TOML file and `SIRENE_*` environment variables.
//!
//! # Configuration File Format
//!
//! ```toml
//! base_url = "https://api.insee.fr/api-sirene/3.11"
//! timeout_secs = 10
//! user_agent = "my-app/1.0"
//! # api_key = "..."   # INSEE_API_KEY takes precedence
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Versioned base endpoint of the Sirene API
pub const DEFAULT_BASE_URL: &str = "https://api.insee.fr/api-sirene/3.11";

/// Environment variable holding the API credential
pub const API_KEY_ENV: &str = "INSEE_API_KEY";

/// Header carrying the API credential on every request
pub const API_KEY_HEADER: &str = "X-INSEE-API-Key-Integration";

/// Per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Prefix for environment overrides of file settings
pub const ENV_PREFIX: &str = "SIRENE";

/// Errors raised while assembling the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {var} is not set")]
    MissingCredential { var: &'static str },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Settings as read from a file and `SIRENE_*` environment variables.
///
/// Every field is optional; absent values fall back to the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub user_agent: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,
}

/// Immutable client configuration
#[derive(Clone)]
pub struct Config {
    api_key: String,
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl Config {
    /// Create a configuration with the given credential and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }

    /// Build from the process environment only (`.env` included)
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_settings(Settings::default(), std::env::var(API_KEY_ENV).ok())
    }

    /// Combine file settings with the credential taken from the environment.
    ///
    /// The environment credential wins over `settings.api_key`.
    pub fn from_settings(settings: Settings, env_key: Option<String>) -> Result<Self, ConfigError> {
        let api_key = env_key
            .or(settings.api_key)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingCredential { var: API_KEY_ENV })?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = settings.base_url {
            config = config.with_base_url(&base_url)?;
        }
        if let Some(secs) = settings.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(user_agent) = settings.user_agent {
            config.user_agent = user_agent;
        }
        Ok(config)
    }

    /// Override the base URL (must be an absolute http(s) URL)
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Load settings from a file, with `SIRENE_*` environment overrides
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Settings from `SIRENE_*` environment variables alone
pub fn env_settings() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Default location of the settings file, if one exists
pub fn find_config_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?
        .join(env!("CARGO_PKG_NAME"))
        .join("config.toml");
    path.is_file().then_some(path)
}

/// Load the full configuration.
///
/// Uses `path` when given, otherwise the default settings file if present,
/// otherwise environment variables only.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let _ = dotenvy::dotenv();

    let settings = match path {
        Some(path) => load_settings(path)?,
        None => match find_config_file() {
            Some(found) => {
                tracing::info!("Using config file: {}", found.display());
                load_settings(&found)?
            }
            None => env_settings()?,
        },
    };

    Config::from_settings(settings, std::env::var(API_KEY_ENV).ok())
}
