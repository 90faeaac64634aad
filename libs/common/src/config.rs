//! Client configuration
//!
//! Layered with Figment: compiled defaults, then an optional file (TOML, YAML
//! or JSON by extension), then `EMBER_`-prefixed environment variables using
//! `__` as the nesting separator (`EMBER_BUILDER__PORT=32480`).

use errors::{EmberError, EmberResult};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default builder host
pub const DEFAULT_BUILDER_HOST: &str = "127.0.0.1";

/// Default builder port
pub const DEFAULT_BUILDER_PORT: u16 = 32479;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "EMBER_";

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Remote builder endpoint
    #[serde(default)]
    pub builder: BuilderEndpoint,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Job validation settings
    #[serde(default)]
    pub validation: ValidationSettings,
}

/// Address of the remote builder
///
/// Handed explicitly to every session and client; there is no process-wide
/// endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderEndpoint {
    /// Builder host name or address
    #[serde(default = "default_host")]
    pub host: String,

    /// Builder port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect timeout in seconds; unset waits for the OS
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,

    /// Colored console output
    #[serde(default = "default_true")]
    pub ansi: bool,

    /// Directory for daily rolling log files; console only when unset
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Job validation settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Check that referenced input files exist on the local disk
    #[serde(default)]
    pub verify_files: bool,
}

// Default value functions
fn default_host() -> String {
    DEFAULT_BUILDER_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_BUILDER_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

// Default implementations
impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            builder: BuilderEndpoint::default(),
            logging: LoggingConfig::default(),
            validation: ValidationSettings::default(),
        }
    }
}

impl Default for BuilderEndpoint {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_secs: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            ansi: true,
            directory: None,
        }
    }
}

impl BuilderEndpoint {
    /// Create an endpoint for `host:port`
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout_secs: None,
        }
    }

    /// Socket address string used for connecting
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connect timeout, if configured
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    /// Reject endpoints that can never connect
    pub fn validate(&self) -> EmberResult<()> {
        if self.host.trim().is_empty() {
            return Err(EmberError::InvalidConfig {
                field: "builder.host".to_string(),
                reason: "host cannot be empty".to_string(),
            });
        }
        if self.port == 0 {
            return Err(EmberError::InvalidConfig {
                field: "builder.port".to_string(),
                reason: "port cannot be zero".to_string(),
            });
        }
        if self.connect_timeout_secs == Some(0) {
            return Err(EmberError::InvalidConfig {
                field: "builder.connect_timeout_secs".to_string(),
                reason: "timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for BuilderEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl ClientConfig {
    /// Base figment: defaults merged with the environment
    pub fn figment(path: Option<&Path>) -> EmberResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(ClientConfig::default()));

        if let Some(path) = path {
            let extension = path
                .extension()
                .and_then(|s| s.to_str())
                .ok_or_else(|| {
                    EmberError::Configuration(format!(
                        "Configuration file has no extension: {}",
                        path.display()
                    ))
                })?;

            figment = match extension {
                "json" => figment.merge(Json::file(path)),
                "toml" => figment.merge(Toml::file(path)),
                "yaml" | "yml" => figment.merge(Yaml::file(path)),
                _ => {
                    return Err(EmberError::Configuration(format!(
                        "Unsupported config format: {}",
                        extension
                    )))
                },
            };
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load configuration from an optional file plus the environment
    pub fn load(path: Option<&Path>) -> EmberResult<Self> {
        if let Some(path) = path {
            if !path.is_file() {
                return Err(EmberError::FileNotFound(path.display().to_string()));
            }
            debug!("Loading client configuration from {}", path.display());
        }

        let config: ClientConfig = Self::figment(path)?.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate loaded values
    pub fn validate(&self) -> EmberResult<()> {
        self.builder.validate()?;
        if self.logging.level.trim().is_empty() {
            return Err(EmberError::InvalidConfig {
                field: "logging.level".to_string(),
                reason: "level cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Render the effective configuration as YAML
    pub fn to_yaml(&self) -> EmberResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
