//! Drime Cloud REST client.
//!
//! Two calls are used:
//! - `POST /uploads`: multipart form with a single `file` part
//! - `POST /file-entries/{id}/shareable-link`
//!
//! Both authenticate with `Authorization: Bearer {token}`.

use std::path::Path;

use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::EntryId;
use super::error::DrimeError;
use crate::config::{ApiToken, RelayConfig};
use crate::user_agent;

/// Value of the upload response `status` field on success.
const SUCCESS_STATUS: &str = "success";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    status: Option<String>,
    #[serde(rename = "fileEntry")]
    file_entry: Option<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ShareLinkResponse {
    url: Option<String>,
    link: Option<ShareLink>,
}

#[derive(Debug, Deserialize)]
struct ShareLink {
    hash: Option<String>,
}

/// Client for the Drime Cloud API.
#[derive(Debug, Clone)]
pub struct DrimeClient {
    client: Client,
    api_base: String,
    share_base: String,
    token: ApiToken,
}

impl DrimeClient {
    /// Creates a client from relay settings.
    ///
    /// # Errors
    ///
    /// Returns [`DrimeError::ClientBuild`] if reqwest rejects the builder
    /// configuration.
    pub fn new(config: &RelayConfig) -> Result<Self, DrimeError> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .user_agent(user_agent::api_user_agent())
            .build()
            .map_err(|source| DrimeError::ClientBuild { source })?;
        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            share_base: config.share_base.clone(),
            token: config.api_token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    /// Uploads the file at `path` as `filename` and returns its entry id.
    ///
    /// The file is streamed from disk as the `file` part of a multipart form.
    ///
    /// # Errors
    ///
    /// - [`DrimeError::Io`] if the file cannot be opened
    /// - [`DrimeError::Request`] on transport failure
    /// - [`DrimeError::UploadRejected`] for any status other than 200
    /// - [`DrimeError::UploadFailed`] when `status` is not `"success"`
    /// - [`DrimeError::MalformedResponse`] when the body is not the expected JSON
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn upload(
        &self,
        path: &Path,
        filename: &str,
        mime_type: &str,
    ) -> Result<EntryId, DrimeError> {
        let endpoint = self.endpoint("/uploads");
        let io_error = |source: std::io::Error| DrimeError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = tokio::fs::File::open(path).await.map_err(io_error)?;
        let length = file.metadata().await.map_err(io_error)?.len();

        let part = Part::stream_with_length(Body::from(file), length)
            .file_name(filename.to_string())
            .mime_str(mime_type)
            .map_err(|e| DrimeError::request(&endpoint, e))?;
        let form = Form::new().part("file", part);

        debug!(bytes = length, "uploading staged file");
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(self.token.expose())
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| DrimeError::request(&endpoint, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DrimeError::request(&endpoint, e))?;

        if status != StatusCode::OK {
            return Err(DrimeError::UploadRejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: UploadResponse = serde_json::from_str(&body)
            .map_err(|e| DrimeError::malformed(&endpoint, e.to_string()))?;

        let reported = parsed.status.unwrap_or_default();
        if reported != SUCCESS_STATUS {
            return Err(DrimeError::UploadFailed { status: reported });
        }

        let entry_id = parsed
            .file_entry
            .and_then(|entry| entry.id)
            .as_ref()
            .and_then(EntryId::from_json)
            .ok_or_else(|| DrimeError::malformed(&endpoint, "missing fileEntry.id"))?;

        info!(entry_id = %entry_id, "upload accepted");
        Ok(entry_id)
    }

    /// Creates a public share link for `entry_id`.
    ///
    /// Uses the `url` field of the response, or builds one from `link.hash`
    /// when only the hash is returned.
    ///
    /// # Errors
    ///
    /// - [`DrimeError::Request`] on transport failure
    /// - [`DrimeError::ShareLinkRejected`] for any status other than 200,
    ///   carrying the raw body
    /// - [`DrimeError::MalformedResponse`] when no link can be extracted
    #[instrument(skip(self, entry_id), fields(entry_id = %entry_id))]
    pub async fn create_share_link(&self, entry_id: &EntryId) -> Result<String, DrimeError> {
        let endpoint = self.endpoint(&format!(
            "/file-entries/{}/shareable-link",
            urlencoding::encode(entry_id.as_str())
        ));

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(self.token.expose())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| DrimeError::request(&endpoint, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DrimeError::request(&endpoint, e))?;

        if status != StatusCode::OK {
            return Err(DrimeError::ShareLinkRejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ShareLinkResponse = serde_json::from_str(&body)
            .map_err(|e| DrimeError::malformed(&endpoint, e.to_string()))?;

        let share_url = parsed
            .url
            .filter(|url| !url.trim().is_empty())
            .or_else(|| {
                parsed
                    .link
                    .and_then(|link| link.hash)
                    .filter(|hash| !hash.is_empty())
                    .map(|hash| format!("{}/{hash}", self.share_base))
            })
            .ok_or_else(|| DrimeError::malformed(&endpoint, "missing url"))?;

        info!(share_url = %share_url, "share link created");
        Ok(share_url)
    }
}
