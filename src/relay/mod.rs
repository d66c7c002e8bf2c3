//! The relay pipeline: source URL in, public share link out.
//!
//! Stages run strictly forward and stop at the first failure:
//!
//! 1. HEAD request and streaming GET of the source
//! 2. Filename resolution and MIME classification
//! 3. Download into a per-run staging directory
//! 4. Multipart upload to Drime
//! 5. Share-link creation
//!
//! The staging directory is removed on every exit path.

mod error;
mod staging;

use reqwest::header::CONTENT_DISPOSITION;
use serde::Serialize;
use tracing::{info, instrument};

use crate::config::RelayConfig;
use crate::download::{HttpClient, TransferProgress, parse_source_url, resolve_filename};
use crate::drime::{DrimeClient, EntryId};
use crate::mime::{PreviewKind, classify_mime};

pub use error::{FailureKind, RelayError};
pub use staging::StagedFile;

/// Something worth telling the user while a run is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// Filename and MIME type are known.
    Resolved {
        filename: String,
        mime_type: &'static str,
    },
    /// Body download started; `total` is the declared length.
    DownloadStarted { total: Option<u64> },
    /// A chunk was written.
    Progress(TransferProgress),
    /// Body fully written.
    Downloaded { bytes: u64 },
    /// Upload request is being sent.
    UploadStarted,
    /// Upload accepted.
    Uploaded { entry_id: EntryId },
    /// Share link is being requested.
    LinkRequested,
}

/// Receives [`RelayEvent`]s. Implemented by front ends (progress bars, logs).
pub trait RelayObserver: Send + Sync {
    fn notify(&self, event: &RelayEvent);
}

/// Discards every event.
impl RelayObserver for () {
    fn notify(&self, _event: &RelayEvent) {}
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayOutcome {
    pub source_url: String,
    pub filename: String,
    pub mime_type: &'static str,
    pub preview: PreviewKind,
    pub bytes: u64,
    pub entry_id: EntryId,
    pub share_url: String,
}

/// Relay pipeline bound to one configuration.
#[derive(Debug, Clone)]
pub struct Relay {
    config: RelayConfig,
    http: HttpClient,
    drime: DrimeClient,
}

impl Relay {
    /// Builds the source and API clients.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client cannot be built.
    pub fn new(config: RelayConfig) -> Result<Self, RelayError> {
        let http = HttpClient::new(&config)?;
        let drime = DrimeClient::new(&config).map_err(RelayError::Upload)?;
        Ok(Self {
            config,
            http,
            drime,
        })
    }

    /// Runs the whole pipeline for `source_url`.
    ///
    /// # Errors
    ///
    /// Returns the [`RelayError`] of the first stage that failed. The staged
    /// file is gone by the time this returns, whatever the outcome.
    #[instrument(skip(self, observer))]
    pub async fn run(
        &self,
        source_url: &str,
        observer: &dyn RelayObserver,
    ) -> Result<RelayOutcome, RelayError> {
        let url = parse_source_url(source_url)?;

        let head = self.http.head_headers(&url).await;
        let response = self.http.fetch(&url).await?;

        // HEAD wins only when it actually names the file.
        let name_headers = head
            .as_ref()
            .filter(|headers| headers.contains_key(CONTENT_DISPOSITION))
            .unwrap_or(response.headers());
        let filename = resolve_filename(&url, name_headers);
        let mime_type = classify_mime(&filename);
        info!(filename = %filename, mime_type, "resolved destination name");
        observer.notify(&RelayEvent::Resolved {
            filename: filename.clone(),
            mime_type,
        });

        let staged = StagedFile::create(self.config.staging_root.as_deref(), &filename).map_err(
            |source| RelayError::Staging {
                path: self
                    .config
                    .staging_root
                    .clone()
                    .unwrap_or_else(std::env::temp_dir),
                source,
            },
        )?;

        observer.notify(&RelayEvent::DownloadStarted {
            total: response.content_length(),
        });
        let downloaded = response
            .stream_to_file(staged.path(), |progress| {
                observer.notify(&RelayEvent::Progress(progress));
            })
            .await?;
        observer.notify(&RelayEvent::Downloaded {
            bytes: downloaded.bytes,
        });

        observer.notify(&RelayEvent::UploadStarted);
        let entry_id = self
            .drime
            .upload(staged.path(), &filename, mime_type)
            .await
            .map_err(RelayError::Upload)?;
        observer.notify(&RelayEvent::Uploaded {
            entry_id: entry_id.clone(),
        });

        observer.notify(&RelayEvent::LinkRequested);
        let share_url = match self.drime.create_share_link(&entry_id).await {
            Ok(url) => url,
            Err(source) => return Err(RelayError::ShareLink { entry_id, source }),
        };

        staged.close();

        info!(share_url = %share_url, entry_id = %entry_id, "relay complete");
        Ok(RelayOutcome {
            source_url: url.to_string(),
            filename,
            mime_type,
            preview: PreviewKind::from_mime(mime_type),
            bytes: downloaded.bytes,
            entry_id,
            share_url,
        })
    }
}
