//! Catalog store collaborators.
//!
//! The pipeline consumes the [`PluginStore`] and [`PluginLinkStore`]
//! traits; the store's own query semantics are out of scope here. Two
//! implementations ship with the crate: [`MemoryStore`] for tests and
//! embedding, and [`JsonFileStore`] persisting the catalog to a single
//! JSON file so the CLI is usable end to end.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::StoreError;
use super::types::{Platform, Plugin, PluginLink};

/// Mutable plugin fields applied on update. `uuid` and `url` are
/// never touched by an update.
#[derive(Debug, Clone)]
pub struct PluginFields {
    /// Display name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Icon reference.
    pub icon: Option<String>,
    /// Version.
    pub version: String,
    /// Sync timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Mutable link fields applied on update.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkFields {
    /// Final delivery URL.
    pub url: String,
    /// Delivery platform.
    pub platform: Platform,
    /// Artifact type tag.
    pub link_type: String,
}

/// Persistence for plugin identity records.
#[async_trait]
pub trait PluginStore: Send + Sync {
    /// All plugins whose canonical URL matches exactly, in store order.
    async fn find_by_url(&self, url: &str) -> Result<Vec<Plugin>, StoreError>;

    /// Look up one plugin by identifier.
    async fn get(&self, uuid: Uuid) -> Result<Option<Plugin>, StoreError>;

    /// Persist a new plugin record.
    async fn create(&self, plugin: Plugin) -> Result<Plugin, StoreError>;

    /// Apply mutable fields to an existing record.
    async fn update(&self, uuid: Uuid, fields: PluginFields) -> Result<Plugin, StoreError>;

    /// All plugins in the catalog.
    async fn list(&self) -> Result<Vec<Plugin>, StoreError>;
}

/// Persistence for per-platform delivery links.
#[async_trait]
pub trait PluginLinkStore: Send + Sync {
    /// All links owned by the given plugin, in store order.
    async fn find_by_plugin(&self, plugin: Uuid) -> Result<Vec<PluginLink>, StoreError>;

    /// Persist a new link.
    async fn create(&self, link: PluginLink) -> Result<PluginLink, StoreError>;

    /// Apply mutable fields to an existing link.
    async fn update(&self, uuid: Uuid, fields: LinkFields) -> Result<PluginLink, StoreError>;

    /// Remove a link.
    async fn destroy(&self, uuid: Uuid) -> Result<(), StoreError>;
}

/// Catalog contents, shared by both built-in stores. Vectors keep
/// insertion order, which is what "first match wins" is defined over.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct CatalogData {
    plugins: Vec<Plugin>,
    links: Vec<PluginLink>,
}

impl CatalogData {
    fn update_plugin(&mut self, uuid: Uuid, fields: PluginFields) -> Result<Plugin, StoreError> {
        let plugin = self
            .plugins
            .iter_mut()
            .find(|p| p.uuid == uuid)
            .ok_or_else(|| StoreError::NotFound(uuid.to_string()))?;

        plugin.name = fields.name;
        plugin.description = fields.description;
        plugin.icon = fields.icon;
        plugin.version = fields.version;
        plugin.updated_at = fields.updated_at;

        Ok(plugin.clone())
    }

    fn update_link(&mut self, uuid: Uuid, fields: LinkFields) -> Result<PluginLink, StoreError> {
        let link = self
            .links
            .iter_mut()
            .find(|l| l.uuid == uuid)
            .ok_or_else(|| StoreError::NotFound(uuid.to_string()))?;

        link.url = fields.url;
        link.platform = fields.platform;
        link.link_type = fields.link_type;

        Ok(link.clone())
    }

    fn destroy_link(&mut self, uuid: Uuid) -> Result<(), StoreError> {
        let before = self.links.len();
        self.links.retain(|l| l.uuid != uuid);
        if self.links.len() == before {
            return Err(StoreError::NotFound(uuid.to_string()));
        }
        Ok(())
    }
}

/// In-memory catalog store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    data: Arc<RwLock<CatalogData>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PluginStore for MemoryStore {
    async fn find_by_url(&self, url: &str) -> Result<Vec<Plugin>, StoreError> {
        Ok(self.data.read().plugins.iter().filter(|p| p.url == url).cloned().collect())
    }

    async fn get(&self, uuid: Uuid) -> Result<Option<Plugin>, StoreError> {
        Ok(self.data.read().plugins.iter().find(|p| p.uuid == uuid).cloned())
    }

    async fn create(&self, plugin: Plugin) -> Result<Plugin, StoreError> {
        self.data.write().plugins.push(plugin.clone());
        Ok(plugin)
    }

    async fn update(&self, uuid: Uuid, fields: PluginFields) -> Result<Plugin, StoreError> {
        self.data.write().update_plugin(uuid, fields)
    }

    async fn list(&self) -> Result<Vec<Plugin>, StoreError> {
        Ok(self.data.read().plugins.clone())
    }
}

#[async_trait]
impl PluginLinkStore for MemoryStore {
    async fn find_by_plugin(&self, plugin: Uuid) -> Result<Vec<PluginLink>, StoreError> {
        Ok(self.data.read().links.iter().filter(|l| l.plugin == plugin).cloned().collect())
    }

    async fn create(&self, link: PluginLink) -> Result<PluginLink, StoreError> {
        self.data.write().links.push(link.clone());
        Ok(link)
    }

    async fn update(&self, uuid: Uuid, fields: LinkFields) -> Result<PluginLink, StoreError> {
        self.data.write().update_link(uuid, fields)
    }

    async fn destroy(&self, uuid: Uuid) -> Result<(), StoreError> {
        self.data.write().destroy_link(uuid)
    }
}

/// Catalog store persisted to a single JSON file. Every mutation is
/// written through immediately.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: RwLock<CatalogData>,
}

impl JsonFileStore {
    /// Open a catalog file, creating an empty catalog if the file does
    /// not exist yet.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let data = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            CatalogData::default()
        };

        Ok(Self { path: path.to_path_buf(), data: RwLock::new(data) })
    }

    fn save(&self, data: &CatalogData) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[async_trait]
impl PluginStore for JsonFileStore {
    async fn find_by_url(&self, url: &str) -> Result<Vec<Plugin>, StoreError> {
        Ok(self.data.read().plugins.iter().filter(|p| p.url == url).cloned().collect())
    }

    async fn get(&self, uuid: Uuid) -> Result<Option<Plugin>, StoreError> {
        Ok(self.data.read().plugins.iter().find(|p| p.uuid == uuid).cloned())
    }

    async fn create(&self, plugin: Plugin) -> Result<Plugin, StoreError> {
        let mut data = self.data.write();
        data.plugins.push(plugin.clone());
        self.save(&data)?;
        Ok(plugin)
    }

    async fn update(&self, uuid: Uuid, fields: PluginFields) -> Result<Plugin, StoreError> {
        let mut data = self.data.write();
        let plugin = data.update_plugin(uuid, fields)?;
        self.save(&data)?;
        Ok(plugin)
    }

    async fn list(&self) -> Result<Vec<Plugin>, StoreError> {
        Ok(self.data.read().plugins.clone())
    }
}

#[async_trait]
impl PluginLinkStore for JsonFileStore {
    async fn find_by_plugin(&self, plugin: Uuid) -> Result<Vec<PluginLink>, StoreError> {
        Ok(self.data.read().links.iter().filter(|l| l.plugin == plugin).cloned().collect())
    }

    async fn create(&self, link: PluginLink) -> Result<PluginLink, StoreError> {
        let mut data = self.data.write();
        data.links.push(link.clone());
        self.save(&data)?;
        Ok(link)
    }

    async fn update(&self, uuid: Uuid, fields: LinkFields) -> Result<PluginLink, StoreError> {
        let mut data = self.data.write();
        let link = data.update_link(uuid, fields)?;
        self.save(&data)?;
        Ok(link)
    }

    async fn destroy(&self, uuid: Uuid) -> Result<(), StoreError> {
        let mut data = self.data.write();
        data.destroy_link(uuid)?;
        self.save(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plugin(url: &str) -> Plugin {
        Plugin {
            uuid: Uuid::new_v4(),
            name: "test".to_string(),
            description: None,
            icon: None,
            version: "1.0.0".to_string(),
            url: url.to_string(),
            updated_at: Utc::now(),
        }
    }

    fn link(plugin: Uuid, platform: Platform, link_type: &str) -> PluginLink {
        PluginLink {
            uuid: Uuid::new_v4(),
            plugin,
            url: "/assets/x.js".to_string(),
            platform,
            link_type: link_type.to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_plugin_round_trip() {
        let store = MemoryStore::new();
        let created = PluginStore::create(&store, plugin("http://x/manifest.json")).await.unwrap();

        let found = store.find_by_url("http://x/manifest.json").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].uuid, created.uuid);

        assert!(store.find_by_url("http://y/manifest.json").await.unwrap().is_empty());
        assert_eq!(store.get(created.uuid).await.unwrap().unwrap().uuid, created.uuid);
    }

    #[tokio::test]
    async fn test_memory_store_preserves_insertion_order() {
        let store = MemoryStore::new();
        let first = PluginStore::create(&store, plugin("http://dup/manifest.json")).await.unwrap();
        let _second =
            PluginStore::create(&store, plugin("http://dup/manifest.json")).await.unwrap();

        let found = store.find_by_url("http://dup/manifest.json").await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].uuid, first.uuid);
    }

    #[tokio::test]
    async fn test_memory_store_update_missing_plugin() {
        let store = MemoryStore::new();
        let fields = PluginFields {
            name: "x".to_string(),
            description: None,
            icon: None,
            version: "1".to_string(),
            updated_at: Utc::now(),
        };
        let err = PluginStore::update(&store, Uuid::new_v4(), fields).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_memory_store_link_lifecycle() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let created =
            PluginLinkStore::create(&store, link(owner, Platform::Web, "widget")).await.unwrap();

        let links = store.find_by_plugin(owner).await.unwrap();
        assert_eq!(links.len(), 1);

        let fields = LinkFields {
            url: "/assets/y.js".to_string(),
            platform: Platform::Web,
            link_type: "widget".to_string(),
        };
        let updated = PluginLinkStore::update(&store, created.uuid, fields).await.unwrap();
        assert_eq!(updated.url, "/assets/y.js");

        store.destroy(created.uuid).await.unwrap();
        assert!(store.find_by_plugin(owner).await.unwrap().is_empty());

        let err = store.destroy(created.uuid).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_json_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let created = {
            let store = JsonFileStore::open(&path).unwrap();
            let created =
                PluginStore::create(&store, plugin("http://x/manifest.json")).await.unwrap();
            PluginLinkStore::create(&store, link(created.uuid, Platform::Service, "api"))
                .await
                .unwrap();
            created
        };

        let reopened = JsonFileStore::open(&path).unwrap();
        let plugins = reopened.list().await.unwrap();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].uuid, created.uuid);
        assert_eq!(reopened.find_by_plugin(created.uuid).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_json_file_store_rejects_corrupt_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Serde(_))));
    }
}
