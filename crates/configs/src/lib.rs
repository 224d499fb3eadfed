//! # configs
//!
//! Runtime settings for the maintenance console.
//!
//! Sources are layered lowest to highest precedence:
//!
//! 1. built-in defaults
//! 2. `config/default.toml` (optional)
//! 3. `config/local.toml` (optional, meant to stay out of version control)
//! 4. `PM__`-prefixed environment variables, e.g. `PM__BACKEND__BASE_URL`
//!
//! A `.env` file in the working directory is loaded into the environment
//! first, so it feeds layer 4.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "PM";
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8448";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackendSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardSettings {
    /// Rows shown in each collapsed dashboard list.
    pub preview_size: usize,
    pub cache_ttl_secs: u64,
}

impl DashboardSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub dashboard: DashboardSettings,
    pub logging: LoggingSettings,
    /// The `.env` file that was loaded, if any. Settings load before logging
    /// exists, so the caller reports this once its subscriber is up.
    #[serde(skip)]
    pub env_file: Option<PathBuf>,
}

impl Settings {
    /// Loads `.env`, then every configuration layer.
    pub fn load() -> Result<Self, ConfigError> {
        let env_file = dotenvy::dotenv().ok();

        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        Ok(Self {
            env_file,
            ..Self::from_builder(builder)?
        })
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("backend.base_url", DEFAULT_BACKEND_URL)?
            .set_default("backend.timeout_secs", 30)?
            .set_default("dashboard.preview_size", 3)?
            .set_default("dashboard.cache_ttl_secs", 30)?
            .set_default("logging.filter", "info,tower_http=debug")?
            .set_default("logging.format", "pretty")?)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.base_url must not be empty".into()));
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Invalid("backend.timeout_secs must be positive".into()));
        }
        if self.dashboard.preview_size == 0 {
            return Err(ConfigError::Invalid("dashboard.preview_size must be positive".into()));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
