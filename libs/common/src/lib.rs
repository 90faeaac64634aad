//! emberlink basic library
//!
//! Provides functions shared by the model, communication and CLI crates:
//! - client configuration loading (file + environment layering)
//! - configuration value fallback helpers
//! - logging bootstrap

pub mod config;
pub mod config_loader;
pub mod logging;

pub use config::{
    BuilderEndpoint, ClientConfig, LogFormat, LoggingConfig, ValidationSettings,
    DEFAULT_BUILDER_HOST, DEFAULT_BUILDER_PORT, ENV_PREFIX,
};
pub use config_loader::{get_config_value, get_string_config};
pub use logging::init_logging;
