//! Application configuration loaded from environment variables.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::Deserialize;
use strum::{Display, EnumString};

use crate::error::ServerError;

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Key used for the platform field of the `/details` response.
///
/// Existing clients read `platfoirm`, so the misspelled key is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlatformKey {
    /// `platfoirm`
    #[default]
    Legacy,
    /// `platform`
    Corrected,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Listening port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Log filter directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Log line format.
    #[serde(default)]
    pub log_format: LogFormat,

    /// Interval between process metric samples, in milliseconds.
    #[serde(default = "default_ops_interval")]
    pub ops_interval_ms: u64,

    /// Platform key spelling for `/details`.
    #[serde(default)]
    pub details_platform_key: PlatformKey,

    /// Expose Prometheus metrics at `/metrics`.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_port() -> u16 {
    5000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ops_interval() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            rust_log: default_log_level(),
            log_format: LogFormat::default(),
            ops_interval_ms: default_ops_interval(),
            details_platform_key: PlatformKey::default(),
            metrics_enabled: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from explicit `(NAME, value)` pairs.
    ///
    /// Empty values count as unset, so `PORT=` falls back to the default.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars.into_iter().filter(|(_, value)| !value.is_empty()))
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), ServerError> {
        self.bind_ip()?;

        if self.ops_interval_ms == 0 {
            return Err(ServerError::InvalidConfig(
                "OPS_INTERVAL_MS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Address the server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(SocketAddr::new(self.bind_ip()?, self.port))
    }

    /// Process metrics sampling interval.
    pub fn ops_interval(&self) -> Duration {
        Duration::from_millis(self.ops_interval_ms)
    }

    fn bind_ip(&self) -> Result<IpAddr, ServerError> {
        self.host
            .parse()
            .map_err(|_| ServerError::InvalidConfig(format!("HOST is not an IP address: {}", self.host)))
    }
}
