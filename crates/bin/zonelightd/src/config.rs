//! Configuration loading: TOML file with environment variable overrides.
//!
//! Reads `zonelight.toml` from the working directory, or the file named by
//! `ZONELIGHT_CONFIG`. Every field has a default so the file is optional.
//! Environment variables take precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use zonelight_app::debounce::DebounceConfig;
use zonelight_domain::config::{ZoneConfig, ensure_unique_names};
use zonelight_domain::error::ZonelightError;
use zonelight_domain::light::LightId;

const DEFAULT_PATH: &str = "zonelight.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    /// Snapshot-save debounce timing shared by every zone.
    pub debounce: DebounceSettings,
    pub zones: Vec<ZoneConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebounceSettings {
    pub cooldown_ms: u64,
    pub immediate: bool,
}

impl Config {
    /// Load the configuration file (if present), apply environment-variable
    /// overrides, then validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is malformed, or if a value
    /// is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("ZONELIGHT_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ZONELIGHT_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("ZONELIGHT_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("ZONELIGHT_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("ZONELIGHT_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("ZONELIGHT_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.debounce.cooldown_ms == 0 {
            return Err(ConfigError::Validation(
                "debounce cooldown must be non-zero".to_string(),
            ));
        }
        for zone in &self.zones {
            zone.clone().normalized()?;
        }
        ensure_unique_names(&self.zones)?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    #[must_use]
    pub fn debounce(&self) -> DebounceConfig {
        DebounceConfig {
            cooldown: Duration::from_millis(self.debounce.cooldown_ms),
            immediate: self.debounce.immediate,
        }
    }

    /// Every light referenced by a zone, sorted and deduplicated.
    #[must_use]
    pub fn light_ids(&self) -> Vec<LightId> {
        let mut ids: Vec<LightId> = self
            .zones
            .iter()
            .flat_map(|zone| zone.lights.iter().cloned())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:zonelight.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "zonelightd=info,zonelight=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for DebounceSettings {
    fn default() -> Self {
        let defaults = DebounceConfig::default();
        Self {
            cooldown_ms: u64::try_from(defaults.cooldown.as_millis()).unwrap_or(u64::MAX),
            immediate: defaults.immediate,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// A zone is misconfigured.
    #[error("invalid zone configuration")]
    Zone(#[from] ZonelightError),
}
