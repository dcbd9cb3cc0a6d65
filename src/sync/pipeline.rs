//! Sync pipeline orchestration.
//!
//! One linear state machine per sync request:
//! `Resolve → Fetch → SyncPluginRecord → BuildDesiredLinks →
//! LoadExistingLinks → Reconcile → ExecuteOperations → ReadBack`.
//! The first failing stage aborts the rest; every error names its
//! stage. There is no mutual exclusion across concurrent syncs of the
//! same canonical URL - callers needing exclusivity serialize
//! externally.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::{SyncError, SyncResult};
use super::hosts::HostConfig;
use super::link_url::build_link_url;
use super::location::resolve;
use super::manifest::FetchManifest;
use super::reconcile::{diff, execute, LinkOp};
use super::record::sync_plugin_record;
use super::retry::{retry, RetryConfig};
use super::store::{PluginLinkStore, PluginStore};
use super::types::{DesiredLink, Plugin, PluginLink};

/// The pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStage {
    /// Classify the location and derive the manifest URL.
    Resolve,
    /// Retrieve and validate the manifest.
    Fetch,
    /// Upsert the plugin identity record.
    SyncPluginRecord,
    /// Derive the desired link set from the manifest.
    BuildDesiredLinks,
    /// Load the links currently persisted for the plugin.
    LoadExistingLinks,
    /// Diff existing against desired.
    Reconcile,
    /// Execute the operation list against the store.
    ExecuteOperations,
    /// Read the authoritative plugin and links back.
    ReadBack,
}

impl std::fmt::Display for SyncStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Resolve => "Resolve",
            Self::Fetch => "Fetch",
            Self::SyncPluginRecord => "SyncPluginRecord",
            Self::BuildDesiredLinks => "BuildDesiredLinks",
            Self::LoadExistingLinks => "LoadExistingLinks",
            Self::Reconcile => "Reconcile",
            Self::ExecuteOperations => "ExecuteOperations",
            Self::ReadBack => "ReadBack",
        };
        write!(f, "{name}")
    }
}

/// Everything one pipeline run needs, passed explicitly: store
/// handles, the fetch seam, host conventions, and the retry policy.
/// No ambient state is consulted and nothing is cached across runs.
#[derive(Clone)]
pub struct SyncContext {
    /// Plugin record store.
    pub plugins: Arc<dyn PluginStore>,
    /// Delivery link store.
    pub links: Arc<dyn PluginLinkStore>,
    /// Manifest retrieval.
    pub fetcher: Arc<dyn FetchManifest>,
    /// Hosting conventions.
    pub hosts: HostConfig,
    /// Retry policy for store calls.
    pub retry: RetryConfig,
}

/// Terminal result of a successful sync: the read-back plugin, its
/// current link set, and the operations that were executed (empty on
/// an idempotent re-run).
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// The authoritative plugin record, read back after the sync.
    pub plugin: Plugin,
    /// The plugin's links as persisted now.
    pub links: Vec<PluginLink>,
    /// The reconciliation operations this run executed.
    pub operations: Vec<LinkOp>,
}

/// Register a plugin by location, or re-sync it if the catalog already
/// knows its canonical URL.
///
/// Completes exactly once with either a [`SyncOutcome`] or a
/// stage-tagged [`SyncError`]. Once link operations start executing
/// the sync is not transactional: a failure there leaves the
/// operations that succeeded in place (see
/// [`SyncError::PartialSync`]).
pub async fn register_or_sync_plugin(ctx: &SyncContext, location: &str) -> SyncResult<SyncOutcome> {
    // Resolve
    let resolved = resolve(location, &ctx.hosts)?;
    tracing::info!(
        location = %location,
        manifest_url = %resolved.manifest_url,
        "Starting plugin sync"
    );

    // Fetch
    let manifest = ctx.fetcher.fetch(&resolved.manifest_url).await?;

    // SyncPluginRecord
    let plugin =
        sync_plugin_record(ctx.plugins.as_ref(), &ctx.retry, &manifest, &resolved.manifest_url)
            .await
            .map_err(|source| SyncError::Persistence {
                stage: SyncStage::SyncPluginRecord,
                source,
            })?;

    // BuildDesiredLinks (pure; uses the authoritative record's
    // updated_at for cache busting)
    let desired: Vec<DesiredLink> = manifest
        .plugins
        .iter()
        .map(|entry| DesiredLink {
            url: build_link_url(
                entry,
                &resolved.location,
                &resolved.root,
                plugin.updated_at,
                &ctx.hosts,
            ),
            platform: entry.platform.clone(),
            link_type: entry.link_type.clone(),
        })
        .collect();

    // LoadExistingLinks
    let existing = retry(&ctx.retry, || ctx.links.find_by_plugin(plugin.uuid))
        .await
        .map_err(|source| SyncError::Persistence { stage: SyncStage::LoadExistingLinks, source })?;

    // Reconcile
    let operations = diff(&existing, &desired);
    tracing::info!(
        plugin = %plugin.uuid,
        existing = existing.len(),
        desired = desired.len(),
        operations = operations.len(),
        "Reconciled link set"
    );

    // ExecuteOperations
    execute(ctx.links.as_ref(), &ctx.retry, plugin.uuid, &operations).await?;

    // ReadBack
    let plugin = retry(&ctx.retry, || ctx.plugins.get(plugin.uuid))
        .await
        .map_err(|source| SyncError::Persistence { stage: SyncStage::ReadBack, source })?
        .ok_or_else(|| SyncError::ReadBack(plugin.uuid.to_string()))?;

    let links = retry(&ctx.retry, || ctx.links.find_by_plugin(plugin.uuid))
        .await
        .map_err(|source| SyncError::Persistence { stage: SyncStage::ReadBack, source })?;

    tracing::info!(plugin = %plugin.uuid, links = links.len(), "Plugin sync complete");

    Ok(SyncOutcome { plugin, links, operations })
}
