//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `unibridge.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use serde::Deserialize;

use unibridge_adapter_webhook::WebhookConfig;
use unibridge_domain::alias::Alias;
use unibridge_domain::circuit::{AnalogTuning, CircuitType};
use unibridge_domain::layout::Aggregation;
use unibridge_domain::rule::RuleConfig;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "unibridge.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How exposed circuits are grouped into accessories.
    #[serde(alias = "agreggate")]
    pub aggregate: Aggregation,
    /// IFTTT maker key used by `ifft` actions.
    pub ifttt_key: Option<String>,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Controller settings.
    pub controller: ControllerConfig,
    /// `room → aliases`; only listed circuits are exposed.
    pub rooms: BTreeMap<String, Vec<String>>,
    /// Explicit `"<TYPE> <address>" → alias` mapping.
    pub aliases: HashMap<String, String>,
    /// Per-alias analog tuning.
    pub config: HashMap<String, AnalogTuning>,
    pub rules: Vec<RuleConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Controller configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// JSON device list for the virtual board; the demo board when absent.
    pub board: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `unibridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file(CONFIG_FILE)?;
        config.apply_overrides(|name| std::env::var(name).ok());
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

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("UNIBRIDGE_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("UNIBRIDGE_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("UNIBRIDGE_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("UNIBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("UNIBRIDGE_IFTTT_KEY") {
            self.ifttt_key = Some(val);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        let listed = self.rooms.values().flatten();
        for alias in listed.chain(self.aliases.values()).chain(self.config.keys()) {
            Alias::new(alias.as_str())
                .map_err(|err| ConfigError::Validation(err.to_string()))?;
        }
        for key in self.aliases.keys() {
            let valid = key
                .split_once(' ')
                .is_some_and(|(code, address)| code.parse::<CircuitType>().is_ok() && !address.is_empty());
            if !valid {
                return Err(ConfigError::Validation(format!(
                    "alias key {key:?} must be \"<TYPE> <address>\""
                )));
            }
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Webhook notifier settings derived from `ifttt_key`.
    #[must_use]
    pub fn webhook(&self) -> WebhookConfig {
        WebhookConfig {
            key: self.ifttt_key.clone(),
            ..WebhookConfig::default()
        }
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

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "unibridged=info,unibridge=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
