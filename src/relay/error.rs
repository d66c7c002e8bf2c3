//! Pipeline-level error aggregation.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::download::DownloadError;
use crate::drime::{DrimeError, EntryId};

/// Failure of one relay run, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Source fetch failed. Nothing was uploaded.
    #[error("download failed: {0}")]
    Download(#[from] DownloadError),

    /// Upload failed. No share link was requested.
    #[error("upload failed: {0}")]
    Upload(#[source] DrimeError),

    /// Upload succeeded but the share link could not be created.
    /// The uploaded entry is left in place.
    #[error("file uploaded as entry {entry_id}, but creating the share link failed: {source}")]
    ShareLink {
        /// Entry created by the upload.
        entry_id: EntryId,
        /// The share-link error.
        #[source]
        source: DrimeError,
    },

    /// The staging directory could not be prepared.
    #[error("could not prepare staging area under {path}: {source}")]
    Staging {
        /// Staging root.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Coarse failure category for user-facing reporting and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No API token configured.
    MissingCredential,
    /// Config file or value invalid.
    Config,
    /// Source fetch failed.
    Download,
    /// Upload failed.
    Upload,
    /// Share link failed after a successful upload.
    ShareLink,
    /// Local failure unrelated to the remote calls.
    Internal,
}

impl RelayError {
    /// Returns the failure category.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Config(ConfigError::MissingCredential) => FailureKind::MissingCredential,
            Self::Config(_) => FailureKind::Config,
            Self::Download(DownloadError::ClientBuild { .. })
            | Self::Upload(DrimeError::ClientBuild { .. })
            | Self::Staging { .. } => FailureKind::Internal,
            Self::Download(_) => FailureKind::Download,
            Self::Upload(_) => FailureKind::Upload,
            Self::ShareLink { .. } => FailureKind::ShareLink,
        }
    }
}
