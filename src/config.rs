//! Application configuration loaded from environment variables.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID
    pub gcp_project_id: String,
    /// Path to the field-boundary GeoJSON file
    pub boundaries_path: String,
    /// Seconds between device-log queue drain passes
    pub poll_interval_secs: u64,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            boundaries_path: "data/field_boundaries.geojson".to_string(),
            poll_interval_secs: 5,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let poll_interval_secs = match env::var("POLL_INTERVAL_SECS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("POLL_INTERVAL_SECS", raw))?,
            Err(_) => 5,
        };

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            boundaries_path: env::var("FIELD_BOUNDARIES_PATH")
                .unwrap_or_else(|_| "data/field_boundaries.geojson".to_string()),
            poll_interval_secs,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
