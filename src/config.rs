//! Runtime configuration
//!
//! The GraphQL endpoint comes from the environment; the per-user directory
//! under `$HOME` only holds the log file.

use std::env;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Environment variable naming the subgraph's HTTP endpoint
pub const ENDPOINT_VAR: &str = "NETWORK_HTTP_URI";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("NETWORK_HTTP_URI is not set; point it at the subgraph's GraphQL endpoint")]
    MissingEndpoint,
    #[error("NETWORK_HTTP_URI={value:?} is not a valid URL: {source}")]
    InvalidEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("NETWORK_HTTP_URI must be an http(s) URL, got scheme {0:?}")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: Url,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let value = env::var(ENDPOINT_VAR).ok();
        Self::from_endpoint(value.as_deref())
    }

    /// Validate a raw endpoint value
    pub fn from_endpoint(value: Option<&str>) -> Result<Config, ConfigError> {
        let value = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEndpoint)?;

        let endpoint = Url::parse(value).map_err(|source| ConfigError::InvalidEndpoint {
            value: value.to_string(),
            source,
        })?;

        match endpoint.scheme() {
            "http" | "https" => Ok(Config { endpoint }),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Short endpoint label for the status bar
    pub fn endpoint_label(&self) -> String {
        match self.endpoint.host_str() {
            Some(host) => format!("{}{}", host, self.endpoint.path().trim_end_matches('/')),
            None => self.endpoint.to_string(),
        }
    }

    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".epoch-tui"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("epoch-tui.log"))
    }
}
