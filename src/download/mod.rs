//! Source fetch: filename resolution and streaming download to disk.
//!
//! # Features
//!
//! - HEAD request for `Content-Disposition` before the body is fetched
//! - Streaming GET written in fixed 8 KiB chunks (memory-bounded)
//! - Percentage progress, or byte counts when the size is unknown
//! - Browser User-Agent and origin Referer on every source request
//! - Structured error types with full context
//!
//! # Example
//!
//! ```no_run
//! use relay_core::download::{HttpClient, parse_source_url, resolve_filename};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::with_settings(Duration::from_secs(60), "example-agent", 8192)?;
//! let url = parse_source_url("https://example.com/video.mp4")?;
//! let response = client.fetch(&url).await?;
//! let filename = resolve_filename(&url, response.headers());
//! let done = response
//!     .stream_to_file(&Path::new("/tmp").join(&filename), |p| println!("{p:?}"))
//!     .await?;
//! println!("{} bytes", done.bytes);
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
mod filename;
mod progress;

pub use client::{DownloadedFile, HttpClient, SourceResponse, parse_source_url};
pub use constants::{CHUNK_SIZE, FALLBACK_FILENAME, TIMEOUT_SECS};
pub use error::DownloadError;
pub use filename::resolve_filename;
pub use progress::TransferProgress;
