//! Core catalog types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery platform for a plugin artifact.
///
/// `web` and `service` carry behavior (relative asset paths and
/// service-host prefixing, cache busting); anything else is preserved
/// verbatim so two unknown platforms never collapse into one
/// reconciliation key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    /// Browser-loaded artifact (gets a cache-busting query parameter).
    Web,
    /// Server-side artifact (local links get the service host prefixed).
    Service,
    /// Any other platform tag, kept as-is.
    Other(String),
}

impl Platform {
    /// The string form used in manifests and persisted links.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Web => "web",
            Self::Service => "service",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Platform {
    fn from(s: String) -> Self {
        match s.as_str() {
            "web" => Self::Web,
            "service" => Self::Service,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Platform {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Platform> for String {
    fn from(p: Platform) -> Self {
        p.as_str().to_string()
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reconciliation identity of a delivery link: `(platform, type)`.
///
/// Never `uuid` or `url` - the manifest has no knowledge of either.
pub type LinkKey = (Platform, String);

/// A persisted plugin identity record.
///
/// `url` (the canonical manifest URL) is the natural identity key even
/// though the store does not enforce it unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plugin {
    /// Generated identifier.
    pub uuid: Uuid,
    /// Display name from the manifest.
    pub name: String,
    /// Description from the manifest.
    pub description: Option<String>,
    /// Icon reference from the manifest.
    pub icon: Option<String>,
    /// Plugin version from the manifest.
    pub version: String,
    /// Canonical manifest URL.
    pub url: String,
    /// Advanced on every sync; feeds the cache-busting parameter.
    pub updated_at: DateTime<Utc>,
}

/// A persisted per-platform delivery link, exclusively owned by its
/// plugin. At most one link per `(plugin, platform, type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginLink {
    /// Generated identifier.
    pub uuid: Uuid,
    /// Owning plugin.
    pub plugin: Uuid,
    /// Final delivery URL.
    pub url: String,
    /// Delivery platform.
    pub platform: Platform,
    /// Artifact type tag.
    #[serde(rename = "type")]
    pub link_type: String,
}

impl PluginLink {
    /// Reconciliation key for this link.
    pub fn key(&self) -> LinkKey {
        (self.platform.clone(), self.link_type.clone())
    }
}

/// A link the current manifest declares should exist. Ephemeral,
/// recomputed on every sync.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredLink {
    /// Final delivery URL.
    pub url: String,
    /// Delivery platform.
    pub platform: Platform,
    /// Artifact type tag.
    pub link_type: String,
}

impl DesiredLink {
    /// Reconciliation key for this link.
    pub fn key(&self) -> LinkKey {
        (self.platform.clone(), self.link_type.clone())
    }
}
