//! # Plugsync
//!
//! Plugin catalog synchronizer - fetch a plugin's manifest and
//! reconcile the persisted catalog to match.
//!
//! A plugin lives either on a local development server or in a
//! published repository. Either way it ships a `manifest.json`
//! describing its deliverable artifacts per platform. Plugsync
//! resolves the manifest location, fetches and validates the
//! manifest, upserts the plugin identity record keyed by its
//! canonical manifest URL, and diffs the persisted delivery links
//! against the manifest-declared set, issuing the minimal
//! create/update/delete operations idempotently with bounded retry.
//!
//! ## Quick Start
//!
//! ```bash
//! # Register a published plugin
//! plugsync sync https://github.com/acme/widget
//!
//! # Register a local development plugin
//! plugsync sync /widgets/acme
//!
//! # Show the catalog
//! plugsync list
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::return_self_not_must_use)]

pub mod sync;

pub use sync::{
    register_or_sync_plugin, FetchManifest, HostConfig, HttpManifestFetcher, JsonFileStore,
    LinkOp, Manifest, ManifestEntry, ManifestLocation, MemoryStore, Platform, Plugin, PluginLink,
    PluginLinkStore, PluginStore, RetryConfig, StoreError, SyncContext, SyncError, SyncOutcome,
    SyncStage,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "plugsync";
