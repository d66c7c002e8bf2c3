//! Error types for Drime API calls.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the upload and share-link calls.
#[derive(Debug, Error)]
pub enum DrimeError {
    /// Transport failure talking to the API.
    #[error("request to {endpoint} failed: {source}")]
    Request {
        /// Endpoint URL.
        endpoint: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// Upload answered with a status other than 200.
    #[error("upload rejected with HTTP {status}: {body}")]
    UploadRejected {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Upload answered 200 but the body did not report success.
    #[error("upload reported status `{status}`")]
    UploadFailed {
        /// The `status` field of the response body.
        status: String,
    },

    /// Response body could not be interpreted.
    #[error("unexpected response from {endpoint}: {reason}")]
    MalformedResponse {
        /// Endpoint URL.
        endpoint: String,
        /// What was wrong with the body.
        reason: String,
    },

    /// Share-link creation answered with a status other than 200.
    #[error("share link rejected with HTTP {status}: {body}")]
    ShareLinkRejected {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The staged file could not be opened for upload.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// Staged file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The API client could not be constructed.
    #[error("failed to build API client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl DrimeError {
    pub(crate) fn request(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            endpoint: endpoint.into(),
            source,
        }
    }

    pub(crate) fn malformed(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}
