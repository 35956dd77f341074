//! API configuration

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use domain_claims::RoutingConfig;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// First import date filed through CDS instead of C285
    pub cds_cutover: Option<NaiveDate>,
    /// Seconds an untouched wizard session is kept before eviction
    pub session_idle_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            cds_cutover: None,
            session_idle_secs: 1800,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    /// Routing settings handed to every new wizard
    pub fn routing(&self) -> RoutingConfig {
        RoutingConfig {
            cds_cutover: self.cds_cutover,
        }
    }
}
