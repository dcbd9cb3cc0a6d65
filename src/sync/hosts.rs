//! Fixed hosting conventions for local and published plugins.
//!
//! Local-development plugins are served from an internal asset host
//! under a well-known prefix; published plugins are fetched from the
//! raw-content host of their repository. Both are configurable but
//! default to the deployment conventions.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading a host configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for this shape.
    #[error("invalid host configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Host conventions used to derive manifest and delivery URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Internal host serving local-development plugin assets.
    pub asset_host: String,

    /// Internal host prefixed onto local `service` delivery links
    /// (scheme + host only).
    pub service_host: String,

    /// Raw-content host for published repositories.
    pub raw_content_host: String,

    /// Branch assumed when a repository URL names none.
    pub default_branch: String,

    /// Path prefix under the asset host where local plugins live.
    pub asset_prefix: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            asset_host: "http://web:80".to_string(),
            service_host: "http://web:80".to_string(),
            raw_content_host: "https://raw.githubusercontent.com".to_string(),
            default_branch: "main".to_string(),
            asset_prefix: "/assets/ab_plugins".to_string(),
        }
    }
}

impl HostConfig {
    /// Parse a host configuration from TOML.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a host configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployment_conventions() {
        let hosts = HostConfig::default();
        assert_eq!(hosts.asset_host, "http://web:80");
        assert_eq!(hosts.raw_content_host, "https://raw.githubusercontent.com");
        assert_eq!(hosts.default_branch, "main");
        assert_eq!(hosts.asset_prefix, "/assets/ab_plugins");
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let hosts = HostConfig::from_toml("asset_host = \"http://localhost:8080\"").unwrap();
        assert_eq!(hosts.asset_host, "http://localhost:8080");
        assert_eq!(hosts.default_branch, "main");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(HostConfig::from_toml("asset_host = [").is_err());
    }
}
