//! Delivery URL derivation.
//!
//! Pure function mapping one manifest entry to its final delivery URL.
//! Local plugins serve out of `dev/`, published ones out of `dist/`;
//! local `service` links get the internal service host prefixed; `web`
//! links get a cache-busting query parameter derived from the plugin's
//! `updated_at`.

use chrono::{DateTime, Utc};

use super::hosts::HostConfig;
use super::location::ManifestLocation;
use super::manifest::ManifestEntry;
use super::types::Platform;

/// Derive the final delivery URL for one manifest entry.
///
/// `root` is the artifact root from location resolution: an absolute
/// URL for published plugins, a host-relative asset path for local
/// ones. `updated_at` is the authoritative plugin record's timestamp,
/// so every sync that touches the record also busts web caches.
pub fn build_link_url(
    entry: &ManifestEntry,
    location: &ManifestLocation,
    root: &str,
    updated_at: DateTime<Utc>,
    hosts: &HostConfig,
) -> String {
    let folder = if location.is_local() { "dev" } else { "dist" };
    let file_path = entry.path.strip_prefix("./").unwrap_or(&entry.path);
    let base_path = format!("{root}/{folder}/{file_path}");

    let mut final_url = if location.is_local() && entry.platform == Platform::Service {
        // Service artifacts are addressed by other services, so they
        // need the full host; everything else local stays a relative
        // asset path.
        format!("{}{}", hosts.service_host, base_path)
    } else {
        base_path
    };

    if entry.platform == Platform::Web {
        let separator = if final_url.contains('?') { '&' } else { '?' };
        final_url = format!("{final_url}{separator}v={}", updated_at.timestamp_millis());
    }

    final_url
}
