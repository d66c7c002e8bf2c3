//! HTTP client wrapper for fetching the source file.
//!
//! This module provides the `HttpClient` struct which checks the source with
//! HEAD, opens a streaming GET, and writes the body to disk in fixed-size
//! chunks while reporting progress.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, REFERER};
use reqwest::{Client, Method, RequestBuilder, Response};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::error::DownloadError;
use super::progress::{ChunkBuffer, TransferProgress};
use crate::config::RelayConfig;
use crate::user_agent;

/// HTTP client for source fetches.
///
/// Every request carries the configured User-Agent and a Referer set to the
/// source URL's origin.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    chunk_size: usize,
}

/// Result of a completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Staged file path.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: u64,
    /// Declared `Content-Length`, when the server sent one.
    pub content_length: Option<u64>,
}

/// Parses and validates a user-supplied source URL.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidUrl`] when the input does not parse, is
/// not `http`/`https`, or has no host.
pub fn parse_source_url(raw: &str) -> Result<Url, DownloadError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|_| DownloadError::invalid_url(trimmed, "not a valid URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(DownloadError::invalid_url(trimmed, "unsupported scheme"));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(DownloadError::invalid_url(trimmed, "missing host"));
    }
    Ok(url)
}

impl HttpClient {
    /// Creates a client from relay settings.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if reqwest rejects the builder
    /// configuration.
    pub fn new(config: &RelayConfig) -> Result<Self, DownloadError> {
        Self::with_settings(config.timeout, &config.user_agent, config.chunk_size)
    }

    /// Creates a client with explicit timeout, User-Agent, and chunk size.
    ///
    /// The timeout bounds the connection attempt and each individual read,
    /// not the whole body.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if reqwest rejects the builder
    /// configuration.
    pub fn with_settings(
        timeout: Duration,
        user_agent: &str,
        chunk_size: usize,
    ) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .gzip(true)
            .user_agent(user_agent)
            .build()
            .map_err(|source| DownloadError::ClientBuild { source })?;
        Ok(Self {
            client,
            chunk_size: chunk_size.max(1),
        })
    }

    /// Chunk size used when writing to disk.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Sends a HEAD request and returns its headers.
    ///
    /// Failures are not fatal: they are logged and `None` is returned so the
    /// caller can resolve the filename from the GET response instead.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn head_headers(&self, url: &Url) -> Option<HeaderMap> {
        match self.request(Method::HEAD, url).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(status = response.status().as_u16(), "HEAD succeeded");
                Some(response.headers().clone())
            }
            Ok(response) => {
                warn!(
                    status = response.status().as_u16(),
                    "HEAD rejected; using GET headers"
                );
                None
            }
            Err(error) => {
                warn!(error = %error, "HEAD request failed; using GET headers");
                None
            }
        }
    }

    /// Opens a streaming GET for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Network`] / [`DownloadError::Timeout`] on
    /// transport failure and [`DownloadError::HttpStatus`] for non-2xx.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<SourceResponse, DownloadError> {
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url.as_str(), status.as_u16()));
        }

        debug!(
            status = status.as_u16(),
            content_length = ?response.content_length(),
            "source responded"
        );
        Ok(SourceResponse {
            url: url.to_string(),
            response,
            chunk_size: self.chunk_size,
        })
    }

    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        let mut request = self.client.request(method, url.clone());
        if let Some(referer) = user_agent::referer_for(url) {
            request = request.header(REFERER, referer);
        }
        request
    }
}

/// An open, successful source response whose body has not been read yet.
#[derive(Debug)]
pub struct SourceResponse {
    url: String,
    response: Response,
    chunk_size: usize,
}

impl SourceResponse {
    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    /// Declared body length, if any.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// Streams the body into a new file at `path`.
    ///
    /// Network frames are regrouped into fixed-size chunks; each chunk is
    /// written immediately and followed by one `on_progress` call.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] on write failure,
    /// [`DownloadError::Network`] if the body stream breaks, and
    /// [`DownloadError::Integrity`] when the written size differs from the
    /// declared `Content-Length`.
    #[instrument(skip(self, on_progress), fields(url = %self.url, path = %path.display()))]
    pub async fn stream_to_file<F>(
        self,
        path: &Path,
        mut on_progress: F,
    ) -> Result<DownloadedFile, DownloadError>
    where
        F: FnMut(TransferProgress),
    {
        let Self {
            url,
            response,
            chunk_size,
        } = self;
        let total = response.content_length();

        let mut file = File::create(path)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        let mut stream = response.bytes_stream();
        let mut buffer = ChunkBuffer::new(chunk_size);
        let mut written: u64 = 0;

        while let Some(frame) = stream.next().await {
            let frame = frame.map_err(|e| DownloadError::network(&url, e))?;
            buffer.extend(&frame);
            while let Some(chunk) = buffer.take_full() {
                write_chunk(&mut file, &chunk, path).await?;
                written += chunk.len() as u64;
                on_progress(TransferProgress::compute(written, total));
            }
        }
        if let Some(rest) = buffer.take_rest() {
            write_chunk(&mut file, &rest, path).await?;
            written += rest.len() as u64;
            on_progress(TransferProgress::compute(written, total));
        }

        file.flush().await.map_err(|e| DownloadError::io(path, e))?;

        if let Some(expected) = total
            && expected != written
        {
            return Err(DownloadError::integrity(path, expected, written));
        }

        info!(path = %path.display(), bytes = written, "download complete");
        Ok(DownloadedFile {
            path: path.to_path_buf(),
            bytes: written,
            content_length: total,
        })
    }
}

async fn write_chunk(file: &mut File, chunk: &[u8], path: &Path) -> Result<(), DownloadError> {
    file.write_all(chunk)
        .await
        .map_err(|e| DownloadError::io(path, e))
}
