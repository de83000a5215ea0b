//! # InfluxDB Config
//!
//! Connection parameters for the target InfluxDB instance. Values come from
//! the settings file's `[influxdb]` section and can be overridden per
//! invocation by CLI flags.

use serde::{Deserialize, Serialize};

fn default_url() -> String {
    "http://localhost:8086".to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InfluxConfig {
    /// Base URL of the HTTP API, e.g. `http://localhost:8086`.
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            user: None,
            password: None,
        }
    }
}

impl InfluxConfig {
    /// Returns a display string for the connection, without the password.
    pub fn display_connection(&self) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, self.url),
            None => self.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InfluxConfig::default();
        assert_eq!(config.url, "http://localhost:8086");
        assert!(config.user.is_none());
    }

    #[test]
    fn test_display_connection_omits_password() {
        let config = InfluxConfig {
            url: "http://influx:8086".to_string(),
            user: Some("admin".to_string()),
            password: Some("hunter2".to_string()),
        };
        let display = config.display_connection();
        assert_eq!(display, "admin@http://influx:8086");
        assert!(!display.contains("hunter2"));
    }
}
