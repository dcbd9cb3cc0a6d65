//! Plugin identity record upsert.
//!
//! The canonical manifest URL is the natural identity key: a sync for
//! a URL the catalog has never seen creates the record; any later sync
//! updates the mutable fields in place and advances `updated_at`. This
//! flow never deletes a plugin record.

use chrono::Utc;
use uuid::Uuid;

use super::error::StoreError;
use super::manifest::Manifest;
use super::retry::{retry, RetryConfig};
use super::store::{PluginFields, PluginStore};
use super::types::Plugin;

/// Upsert the plugin record for `canonical_url` from the fetched
/// manifest and return the authoritative record.
///
/// Duplicate records for one URL are a pre-existing data anomaly; the
/// first match wins and the rest are left untouched. Every store call
/// goes through the bounded-retry executor; an exhausted bound
/// surfaces the underlying `StoreError` unmodified.
pub async fn sync_plugin_record(
    store: &dyn PluginStore,
    retry_cfg: &RetryConfig,
    manifest: &Manifest,
    canonical_url: &str,
) -> Result<Plugin, StoreError> {
    let existing = retry(retry_cfg, || store.find_by_url(canonical_url)).await?;

    if let Some(first) = existing.first() {
        tracing::info!(uuid = %first.uuid, url = %canonical_url, "Updating existing plugin");

        let fields = PluginFields {
            name: manifest.name.clone(),
            description: manifest.description.clone(),
            icon: manifest.icon.clone(),
            version: manifest.version.clone(),
            updated_at: Utc::now(),
        };
        let uuid = first.uuid;
        retry(retry_cfg, || store.update(uuid, fields.clone())).await
    } else {
        tracing::info!(url = %canonical_url, "Creating new plugin");

        let plugin = Plugin {
            uuid: Uuid::new_v4(),
            name: manifest.name.clone(),
            description: manifest.description.clone(),
            icon: manifest.icon.clone(),
            version: manifest.version.clone(),
            url: canonical_url.to_string(),
            updated_at: Utc::now(),
        };
        retry(retry_cfg, || store.create(plugin.clone())).await
    }
}
