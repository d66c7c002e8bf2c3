//! Drime Relay Core Library
//!
//! This library moves a single file from a direct download URL into Drime
//! Cloud storage and publishes a public share link for it.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Credential and settings resolution (file + environment)
//! - [`download`] - Filename resolution and streaming download to a staged file
//! - [`mime`] - Extension based MIME classification and preview hints
//! - [`drime`] - Drime Cloud API client (upload, shareable link)
//! - [`relay`] - The forward-only pipeline tying the stages together

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod drime;
pub mod mime;
pub mod relay;
mod user_agent;

// Re-export commonly used types
pub use config::{ApiToken, ConfigError, FileConfig, RelayConfig};
pub use download::{DownloadError, HttpClient, TransferProgress, resolve_filename};
pub use drime::{DrimeClient, DrimeError, EntryId};
pub use mime::{PreviewKind, classify_mime};
pub use relay::{FailureKind, Relay, RelayError, RelayEvent, RelayObserver, RelayOutcome};
