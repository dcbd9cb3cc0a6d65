//! Sync pipeline error types.

use thiserror::Error;

use super::pipeline::SyncStage;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced by the plugin store collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record matched the given key.
    #[error("record not found: {0}")]
    NotFound(String),

    /// The store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Persisted data failed to (de)serialize.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can abort a sync. Every variant maps to the pipeline
/// stage it failed in via [`SyncError::stage`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// Malformed input location (e.g. a repository URL with fewer than
    /// two path segments). Raised before any network call.
    #[error("invalid plugin location: {0}")]
    InvalidLocation(String),

    /// Non-success HTTP status fetching the manifest. Not retried at
    /// this layer.
    #[error("failed to fetch manifest ({url}): HTTP {status} {status_text}")]
    Fetch {
        /// The manifest URL that was requested.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Canonical status text, if any.
        status_text: String,
    },

    /// The manifest host could not be reached at all.
    #[error("failed to reach manifest host ({url}): {message}")]
    Network {
        /// The manifest URL that was requested.
        url: String,
        /// Transport-level error description.
        message: String,
    },

    /// The manifest body does not match the expected shape.
    #[error("manifest at {url} does not parse: {message}")]
    Parse {
        /// The manifest URL that was requested.
        url: String,
        /// Deserialization error description.
        message: String,
    },

    /// A store operation failed after exhausting retries. Effects
    /// already committed are not reverted.
    #[error("persistence failed during {stage}: {source}")]
    Persistence {
        /// The pipeline stage that was executing.
        stage: SyncStage,
        /// The underlying store failure, unmodified.
        #[source]
        source: StoreError,
    },

    /// One or more link operations failed after retries; the ones that
    /// succeeded stand. Non-transactional by design.
    #[error("{failed} of {total} link operations failed; completed operations were not rolled back")]
    PartialSync {
        /// Number of failed operations.
        failed: usize,
        /// Total operations attempted.
        total: usize,
    },

    /// The plugin record could not be read back after the sync.
    #[error("plugin record disappeared after sync: {0}")]
    ReadBack(String),
}

impl SyncError {
    /// The pipeline stage this error belongs to.
    pub fn stage(&self) -> SyncStage {
        match self {
            Self::InvalidLocation(_) => SyncStage::Resolve,
            Self::Fetch { .. } | Self::Network { .. } | Self::Parse { .. } => SyncStage::Fetch,
            Self::Persistence { stage, .. } => *stage,
            Self::PartialSync { .. } => SyncStage::ExecuteOperations,
            Self::ReadBack(_) => SyncStage::ReadBack,
        }
    }
}
