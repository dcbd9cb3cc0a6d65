//! Manifest location resolution.
//!
//! Classifies an operator-supplied location string as either a local
//! development path or a published repository URL, and derives the
//! manifest URL plus the artifact root used to build delivery links.

use serde::{Deserialize, Serialize};

use super::error::SyncError;
use super::hosts::HostConfig;

/// A classified plugin location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManifestLocation {
    /// Local development path, served from the internal asset host.
    LocalPath(String),
    /// Published repository, served from the raw-content host.
    RemoteRepo {
        /// Repository owner (first path segment).
        owner: String,
        /// Repository name, `.git` suffix stripped.
        repo: String,
        /// Branch, defaulting to the configured default branch.
        branch: String,
    },
}

impl ManifestLocation {
    /// Whether this is a local development location.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::LocalPath(_))
    }
}

/// A resolved manifest source: where the manifest lives and where the
/// plugin's artifacts are rooted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedManifest {
    /// The classified location.
    pub location: ManifestLocation,
    /// Canonical manifest URL. Also the plugin's identity key.
    pub manifest_url: String,
    /// Artifact root: for remote repos the manifest URL minus
    /// `/manifest.json`; for local paths the host-relative asset path
    /// (links that need a host get one prefixed later).
    pub root: String,
}

/// Classify a raw location string and derive its manifest URL and root.
///
/// Anything with an http(s) scheme is parsed as a repository URL
/// (`https://host/owner/repo[.git][/tree/branch]`); everything else is
/// treated as a local development path.
pub fn resolve(input: &str, hosts: &HostConfig) -> Result<ResolvedManifest, SyncError> {
    if has_http_scheme(input) {
        resolve_remote(input, hosts)
    } else {
        Ok(resolve_local(input, hosts))
    }
}

fn has_http_scheme(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn resolve_local(input: &str, hosts: &HostConfig) -> ResolvedManifest {
    // Normalize to a leading slash.
    let local_path =
        if input.starts_with('/') { input.to_string() } else { format!("/{input}") };

    let root = format!("{}{}", hosts.asset_prefix, local_path);
    let manifest_url = format!("{}{}/manifest.json", hosts.asset_host, root);

    tracing::debug!(manifest_url = %manifest_url, "Treating location as local path");

    ResolvedManifest { location: ManifestLocation::LocalPath(local_path), manifest_url, root }
}

fn resolve_remote(input: &str, hosts: &HostConfig) -> Result<ResolvedManifest, SyncError> {
    // Strip scheme, host, query, and fragment; keep the path segments.
    let after_scheme = match input.find("://") {
        Some(idx) => &input[idx + 3..],
        None => input,
    };
    let without_extras =
        after_scheme.split(['?', '#']).next().unwrap_or(after_scheme);

    let mut segments = without_extras.split('/').filter(|s| !s.is_empty());
    let _host = segments.next();
    let segments: Vec<&str> = segments.collect();

    if segments.len() < 2 {
        return Err(SyncError::InvalidLocation(format!(
            "expected a repository URL like https://github.com/owner/repo, got: {input}"
        )));
    }

    let owner = segments[0].to_string();
    let repo = segments[1].strip_suffix(".git").unwrap_or(segments[1]).to_string();

    // Branch defaults, overridden by a /tree/<branch> suffix.
    let branch = if segments.len() >= 3 && segments[2] == "tree" {
        segments.get(3).map_or_else(|| hosts.default_branch.clone(), |b| (*b).to_string())
    } else {
        hosts.default_branch.clone()
    };

    let manifest_url =
        format!("{}/{owner}/{repo}/{branch}/manifest.json", hosts.raw_content_host);
    let root = manifest_url
        .strip_suffix("/manifest.json")
        .unwrap_or(&manifest_url)
        .to_string();

    tracing::debug!(manifest_url = %manifest_url, "Treating location as repository URL");

    Ok(ResolvedManifest {
        location: ManifestLocation::RemoteRepo { owner, repo, branch },
        manifest_url,
        root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> HostConfig {
        HostConfig::default()
    }

    #[test]
    fn test_local_path_without_leading_slash() {
        let resolved = resolve("foo/bar", &hosts()).unwrap();
        assert_eq!(resolved.location, ManifestLocation::LocalPath("/foo/bar".to_string()));
        assert_eq!(
            resolved.manifest_url,
            "http://web:80/assets/ab_plugins/foo/bar/manifest.json"
        );
        assert_eq!(resolved.root, "/assets/ab_plugins/foo/bar");
    }

    #[test]
    fn test_local_path_with_leading_slash() {
        let resolved = resolve("/widgets/acme", &hosts()).unwrap();
        assert_eq!(
            resolved.manifest_url,
            "http://web:80/assets/ab_plugins/widgets/acme/manifest.json"
        );
        assert_eq!(resolved.root, "/assets/ab_plugins/widgets/acme");
    }

    #[test]
    fn test_remote_repo_default_branch() {
        let resolved = resolve("https://github.com/acme/widget", &hosts()).unwrap();
        assert_eq!(
            resolved.location,
            ManifestLocation::RemoteRepo {
                owner: "acme".to_string(),
                repo: "widget".to_string(),
                branch: "main".to_string(),
            }
        );
        assert_eq!(
            resolved.manifest_url,
            "https://raw.githubusercontent.com/acme/widget/main/manifest.json"
        );
        assert_eq!(resolved.root, "https://raw.githubusercontent.com/acme/widget/main");
    }

    #[test]
    fn test_remote_repo_git_suffix_stripped() {
        let resolved = resolve("https://github.com/acme/widget.git", &hosts()).unwrap();
        assert_eq!(
            resolved.manifest_url,
            "https://raw.githubusercontent.com/acme/widget/main/manifest.json"
        );
    }

    #[test]
    fn test_remote_repo_tree_branch() {
        let resolved = resolve("https://github.com/acme/widget/tree/dev", &hosts()).unwrap();
        match resolved.location {
            ManifestLocation::RemoteRepo { branch, .. } => assert_eq!(branch, "dev"),
            ManifestLocation::LocalPath(_) => panic!("expected remote repo"),
        }
        assert_eq!(
            resolved.manifest_url,
            "https://raw.githubusercontent.com/acme/widget/dev/manifest.json"
        );
    }

    #[test]
    fn test_remote_repo_tree_without_branch_falls_back() {
        let resolved = resolve("https://github.com/acme/widget/tree", &hosts()).unwrap();
        match resolved.location {
            ManifestLocation::RemoteRepo { branch, .. } => assert_eq!(branch, "main"),
            ManifestLocation::LocalPath(_) => panic!("expected remote repo"),
        }
    }

    #[test]
    fn test_remote_repo_too_few_segments() {
        let err = resolve("https://github.com/acme", &hosts()).unwrap_err();
        assert!(matches!(err, SyncError::InvalidLocation(_)));

        let err = resolve("https://github.com/", &hosts()).unwrap_err();
        assert!(matches!(err, SyncError::InvalidLocation(_)));
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let resolved = resolve("HTTPS://github.com/acme/widget", &hosts()).unwrap();
        assert!(!resolved.location.is_local());
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        let resolved =
            resolve("https://github.com/acme/widget?tab=readme#top", &hosts()).unwrap();
        assert_eq!(
            resolved.manifest_url,
            "https://raw.githubusercontent.com/acme/widget/main/manifest.json"
        );
    }

    #[test]
    fn test_custom_hosts() {
        let hosts = HostConfig {
            asset_host: "http://localhost:8080".to_string(),
            default_branch: "master".to_string(),
            ..HostConfig::default()
        };

        let resolved = resolve("foo", &hosts).unwrap();
        assert_eq!(
            resolved.manifest_url,
            "http://localhost:8080/assets/ab_plugins/foo/manifest.json"
        );

        let resolved = resolve("https://github.com/a/b", &hosts).unwrap();
        assert_eq!(
            resolved.manifest_url,
            "https://raw.githubusercontent.com/a/b/master/manifest.json"
        );
    }
}
