//! # Settings
//!
//! Optional user-level configuration, read from
//! `~/.influx-schema/config.toml` and overridable through
//! `INFLUX_SCHEMA_*` environment variables (e.g.
//! `INFLUX_SCHEMA_LOGGER__LEVEL=debug`). Everything has a sensible default
//! so the tool works with no settings file at all.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::infrastructure::olap::influx::config::InfluxConfig;

const CONFIG_DIR: &str = ".influx-schema";
const CONFIG_FILE: &str = "config.toml";
const ENVIRONMENT_PREFIX: &str = "INFLUX_SCHEMA";

#[derive(Deserialize, Debug, Clone)]
pub struct LoggerSettings {
    /// Default tracing filter when RUST_LOG is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub logger: LoggerSettings,
    /// Connection defaults; CLI flags take precedence field by field.
    #[serde(default)]
    pub influxdb: InfluxConfig,
}

fn config_file_path() -> Option<PathBuf> {
    home::home_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Reads the settings, layering the optional user file under environment
/// overrides.
pub fn read_settings() -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = config_file_path() {
        builder = builder.add_source(File::from(path).required(false));
    }
    builder
        .add_source(Environment::with_prefix(ENVIRONMENT_PREFIX).separator("__"))
        .build()?
        .try_deserialize()
}
