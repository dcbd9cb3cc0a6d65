//! Manifest schema and the fetch boundary.
//!
//! A manifest is a JSON document at the resolved manifest URL that
//! declares the plugin's identity and one entry per deliverable
//! artifact. It is validated into [`Manifest`] at the fetch boundary;
//! anything that does not match the shape fails fast.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::SyncError;
use super::types::Platform;

/// A plugin manifest document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Plugin display name.
    pub name: String,
    /// Plugin description.
    #[serde(default)]
    pub description: Option<String>,
    /// Icon reference.
    #[serde(default)]
    pub icon: Option<String>,
    /// Plugin version.
    pub version: String,
    /// Deliverable artifacts, in manifest order.
    pub plugins: Vec<ManifestEntry>,
}

/// One deliverable artifact declared by a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Artifact path relative to the plugin root (a leading `./` is
    /// tolerated and stripped when building the delivery URL).
    pub path: String,
    /// Delivery platform.
    pub platform: Platform,
    /// Artifact type tag. Manifests may omit it; it then participates
    /// in the reconciliation key as the empty string.
    #[serde(rename = "type", default)]
    pub link_type: String,
}

impl Manifest {
    /// Parse a manifest from a JSON string, failing with `ParseError`
    /// semantics on shape mismatch.
    pub fn from_json(url: &str, body: &str) -> Result<Self, SyncError> {
        serde_json::from_str(body)
            .map_err(|e| SyncError::Parse { url: url.to_string(), message: e.to_string() })
    }
}

/// The manifest retrieval seam. The pipeline only ever sees this
/// trait, so orchestration is testable without a network.
#[async_trait]
pub trait FetchManifest: Send + Sync {
    /// Retrieve and validate the manifest at `manifest_url`.
    async fn fetch(&self, manifest_url: &str) -> Result<Manifest, SyncError>;
}

/// HTTP manifest fetcher. Follows redirects (reqwest default policy)
/// and fails on any non-success status.
pub struct HttpManifestFetcher {
    client: reqwest::Client,
}

impl HttpManifestFetcher {
    /// Create a fetcher with a 30 second timeout and the crate
    /// user-agent.
    pub fn new() -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!("plugsync/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::Network {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FetchManifest for HttpManifestFetcher {
    async fn fetch(&self, manifest_url: &str) -> Result<Manifest, SyncError> {
        tracing::debug!(url = %manifest_url, "Fetching manifest");

        let response = self.client.get(manifest_url).send().await.map_err(|e| {
            SyncError::Network { url: manifest_url.to_string(), message: e.to_string() }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Fetch {
                url: manifest_url.to_string(),
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.text().await.map_err(|e| SyncError::Network {
            url: manifest_url.to_string(),
            message: e.to_string(),
        })?;

        let manifest = Manifest::from_json(manifest_url, &body)?;

        tracing::info!(
            url = %manifest_url,
            name = %manifest.name,
            version = %manifest.version,
            entries = manifest.plugins.len(),
            "Fetched manifest"
        );

        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_MANIFEST: &str = r#"{
        "name": "Netsuite Connector",
        "description": "Connects objects to Netsuite",
        "icon": "plug",
        "version": "1.2.0",
        "plugins": [
            { "path": "./connector_web.js", "platform": "web", "type": "widget" },
            { "path": "./connector_service.js", "platform": "service", "type": "api" }
        ]
    }"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_json("http://x/manifest.json", SAMPLE_MANIFEST).unwrap();
        assert_eq!(manifest.name, "Netsuite Connector");
        assert_eq!(manifest.version, "1.2.0");
        assert_eq!(manifest.plugins.len(), 2);
        assert_eq!(manifest.plugins[0].platform, Platform::Web);
        assert_eq!(manifest.plugins[1].platform, Platform::Service);
        assert_eq!(manifest.plugins[1].link_type, "api");
    }

    #[test]
    fn test_parse_manifest_entry_order_preserved() {
        let manifest = Manifest::from_json("http://x/manifest.json", SAMPLE_MANIFEST).unwrap();
        assert_eq!(manifest.plugins[0].path, "./connector_web.js");
        assert_eq!(manifest.plugins[1].path, "./connector_service.js");
    }

    #[test]
    fn test_parse_manifest_missing_type_defaults_empty() {
        let body = r#"{
            "name": "x", "version": "1.0.0",
            "plugins": [{ "path": "./a.js", "platform": "web" }]
        }"#;
        let manifest = Manifest::from_json("http://x/manifest.json", body).unwrap();
        assert_eq!(manifest.plugins[0].link_type, "");
    }

    #[test]
    fn test_parse_manifest_optional_description_and_icon() {
        let body = r#"{ "name": "x", "version": "1.0.0", "plugins": [] }"#;
        let manifest = Manifest::from_json("http://x/manifest.json", body).unwrap();
        assert_eq!(manifest.description, None);
        assert_eq!(manifest.icon, None);
    }

    #[test]
    fn test_parse_manifest_shape_mismatch() {
        let err = Manifest::from_json("http://x/manifest.json", "{\"name\": \"x\"}").unwrap_err();
        assert!(matches!(err, SyncError::Parse { .. }));

        let err = Manifest::from_json("http://x/manifest.json", "not json").unwrap_err();
        assert!(matches!(err, SyncError::Parse { .. }));
    }

    #[test]
    fn test_parse_manifest_unknown_platform_preserved() {
        let body = r#"{
            "name": "x", "version": "1.0.0",
            "plugins": [{ "path": "./a.bin", "platform": "desktop", "type": "binary" }]
        }"#;
        let manifest = Manifest::from_json("http://x/manifest.json", body).unwrap();
        assert_eq!(manifest.plugins[0].platform, Platform::Other("desktop".to_string()));
    }
}
