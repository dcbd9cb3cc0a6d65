//! Plugin catalog synchronization.
//!
//! An operator registers a plugin by location - a local development
//! path or a published repository URL. This module resolves where the
//! plugin's manifest lives, fetches and validates it, upserts the
//! plugin identity record, and reconciles the persisted per-platform
//! delivery links against what the manifest declares, issuing the
//! minimal create/update/delete set with bounded retry.
//!
//! # Pipeline
//!
//! `Resolve → Fetch → SyncPluginRecord → BuildDesiredLinks →
//! LoadExistingLinks → Reconcile → ExecuteOperations → ReadBack`
//!
//! Entry point: [`register_or_sync_plugin`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use plugsync::sync::{
//!     register_or_sync_plugin, HostConfig, HttpManifestFetcher, MemoryStore, RetryConfig,
//!     SyncContext,
//! };
//!
//! # async fn run() -> Result<(), plugsync::sync::SyncError> {
//! let store = Arc::new(MemoryStore::new());
//! let ctx = SyncContext {
//!     plugins: store.clone(),
//!     links: store,
//!     fetcher: Arc::new(HttpManifestFetcher::new()?),
//!     hosts: HostConfig::default(),
//!     retry: RetryConfig::default(),
//! };
//!
//! let outcome = register_or_sync_plugin(&ctx, "https://github.com/acme/widget").await?;
//! println!("synced {} with {} links", outcome.plugin.name, outcome.links.len());
//! # Ok(())
//! # }
//! ```

mod error;
mod hosts;
mod link_url;
mod location;
mod manifest;
mod pipeline;
mod reconcile;
mod record;
mod retry;
mod store;
mod types;

pub use error::{StoreError, SyncError, SyncResult};
pub use hosts::{ConfigError, HostConfig};
pub use link_url::build_link_url;
pub use location::{resolve, ManifestLocation, ResolvedManifest};
pub use manifest::{FetchManifest, HttpManifestFetcher, Manifest, ManifestEntry};
pub use pipeline::{register_or_sync_plugin, SyncContext, SyncOutcome, SyncStage};
pub use reconcile::{diff, execute, LinkOp};
pub use record::sync_plugin_record;
pub use retry::{retry, RetryConfig};
pub use store::{
    JsonFileStore, LinkFields, MemoryStore, PluginFields, PluginLinkStore, PluginStore,
};
pub use types::{DesiredLink, LinkKey, Platform, Plugin, PluginLink};
