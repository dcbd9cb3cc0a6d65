//! Link set reconciliation.
//!
//! Diffs the links persisted for a plugin against the set the current
//! manifest declares, keyed by `(platform, type)`, and emits the
//! minimal create/update/delete operations. Keys partition the link
//! set disjointly, so the emitted operations have no ordering
//! dependency and execute concurrently.

use std::collections::HashMap;

use futures::future::join_all;
use uuid::Uuid;

use super::error::SyncError;
use super::retry::{retry, RetryConfig};
use super::store::{LinkFields, PluginLinkStore};
use super::types::{DesiredLink, LinkKey, PluginLink};

/// One reconciliation operation against the link store.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkOp {
    /// Persist a link that exists in the manifest but not the catalog.
    Create(DesiredLink),
    /// Rewrite a persisted link whose URL no longer matches.
    Update {
        /// The persisted link to rewrite.
        uuid: Uuid,
        /// The fields it should carry.
        fields: LinkFields,
    },
    /// Remove a persisted link the manifest no longer declares.
    Delete {
        /// The persisted link to remove.
        uuid: Uuid,
    },
}

fn key_label(key: &LinkKey) -> String {
    format!("{}_{}", key.0, key.1)
}

/// Compute the operation list aligning `existing` with `desired`.
///
/// Duplicate `(platform, type)` keys among existing links are a
/// pre-existing anomaly: the first encountered wins for comparison
/// purposes. Deletion still walks every existing row, so duplicate
/// rows for a key the manifest dropped are all removed.
pub fn diff(existing: &[PluginLink], desired: &[DesiredLink]) -> Vec<LinkOp> {
    // Index existing links by key; first encountered wins.
    let mut index: HashMap<LinkKey, &PluginLink> = HashMap::new();
    for link in existing {
        index.entry(link.key()).or_insert(link);
    }

    let mut ops = Vec::new();
    let mut desired_keys: Vec<LinkKey> = Vec::with_capacity(desired.len());

    for want in desired {
        let key = want.key();

        // A manifest declaring the same key twice would otherwise
        // emit two creates; first entry wins, matching the policy on
        // the existing side.
        if desired_keys.contains(&key) {
            tracing::warn!(key = %key_label(&key), "Duplicate manifest entry for link key, skipping");
            continue;
        }
        desired_keys.push(key.clone());

        match index.get(&key) {
            None => {
                tracing::info!(key = %key_label(&key), "Creating new plugin link");
                ops.push(LinkOp::Create(want.clone()));
            }
            Some(have) if have.url != want.url => {
                tracing::info!(key = %key_label(&key), "Updating plugin link - URL changed");
                ops.push(LinkOp::Update {
                    uuid: have.uuid,
                    fields: LinkFields {
                        url: want.url.clone(),
                        platform: want.platform.clone(),
                        link_type: want.link_type.clone(),
                    },
                });
            }
            Some(_) => {}
        }
    }

    for link in existing {
        if !desired_keys.contains(&link.key()) {
            tracing::info!(key = %key_label(&link.key()), "Removing plugin link - not in manifest");
            ops.push(LinkOp::Delete { uuid: link.uuid });
        }
    }

    ops
}

/// Execute an operation list concurrently, each operation wrapped in
/// bounded retry.
///
/// Operations are not transactional: any that fail after retries are
/// reported via `PartialSyncError` while the ones that succeeded
/// stand. Created links get their identifier assigned once, up front,
/// so a retried create never mints a second row.
pub async fn execute(
    store: &dyn PluginLinkStore,
    retry_cfg: &RetryConfig,
    plugin: Uuid,
    ops: &[LinkOp],
) -> Result<(), SyncError> {
    let total = ops.len();

    let results = join_all(ops.iter().map(|op| async move {
        match op {
            LinkOp::Create(want) => {
                let link = PluginLink {
                    uuid: Uuid::new_v4(),
                    plugin,
                    url: want.url.clone(),
                    platform: want.platform.clone(),
                    link_type: want.link_type.clone(),
                };
                retry(retry_cfg, || store.create(link.clone())).await.map(|_| ())
            }
            LinkOp::Update { uuid, fields } => {
                retry(retry_cfg, || store.update(*uuid, fields.clone())).await.map(|_| ())
            }
            LinkOp::Delete { uuid } => retry(retry_cfg, || store.destroy(*uuid)).await,
        }
    }))
    .await;

    let failed = results
        .iter()
        .filter(|r| {
            if let Err(e) = r {
                tracing::error!(error = %e, "Link operation failed after retries");
                true
            } else {
                false
            }
        })
        .count();

    if failed > 0 {
        return Err(SyncError::PartialSync { failed, total });
    }

    Ok(())
}
