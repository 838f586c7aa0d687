//! PokerSync configuration system.
//!
//! Provides TOML-based configuration with full validation. All config
//! sections use sensible defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pokersync_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    LogLevel, LoggingConfig, PokerSyncConfig, ServerConfig, SessionConfig, CONFIG_SCHEMA_VERSION,
};

use pokersync_common::ConfigError;
use std::path::Path;

/// Load config from the platform default path, creating it if missing.
pub fn load_config() -> Result<PokerSyncConfig, ConfigError> {
    toml_loader::load_default()
}

/// Load config from an explicit path, or the platform default if `None`.
pub fn load_config_from(path: Option<&Path>) -> Result<PokerSyncConfig, ConfigError> {
    match path {
        Some(p) => toml_loader::load_from_path(p),
        None => load_config(),
    }
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &PokerSyncConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
