//! Failures of the source fetch.
//!
//! Every variant carries the URL or staged path it concerns, so the CLI can
//! print a single line without extra context.

use std::path::PathBuf;

use thiserror::Error;

/// Why the source file could not be staged locally.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// DNS, connect, TLS, or a broken body stream.
    #[error("could not fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Connect or read exceeded the configured timeout.
    #[error("source {url} timed out")]
    Timeout { url: String },

    /// Source answered outside 2xx.
    #[error("source {url} answered HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Staged file could not be created or written.
    #[error("cannot write staged file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not an absolute http(s) URL with a host.
    #[error("invalid URL: {url} ({reason})")]
    InvalidUrl { url: String, reason: &'static str },

    /// Bytes on disk differ from the declared `Content-Length`.
    #[error(
        "size mismatch for {path}: server declared {expected_bytes} bytes, received {actual_bytes}"
    )]
    Integrity {
        path: PathBuf,
        expected_bytes: u64,
        actual_bytes: u64,
    },

    #[error("failed to build source HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

impl DownloadError {
    /// Wraps a reqwest failure; timeouts get their own variant.
    pub(crate) fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    pub(crate) fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_url(url: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason,
        }
    }

    pub(crate) fn integrity(
        path: impl Into<PathBuf>,
        expected_bytes: u64,
        actual_bytes: u64,
    ) -> Self {
        Self::Integrity {
            path: path.into(),
            expected_bytes,
            actual_bytes,
        }
    }
}
