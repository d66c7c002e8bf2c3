//! Progress UI for a relay run.
//!
//! A percentage bar while the size is known, a byte-counting spinner
//! otherwise, and a spinner with a status message for the API calls.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use relay_core::{RelayEvent, RelayObserver, TransferProgress};

/// Terminal observer backed by an indicatif bar on stderr.
pub(crate) struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    /// Creates a visible bar when `enabled`, otherwise a hidden one.
    pub(crate) fn new(enabled: bool) -> Self {
        let bar = if enabled {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }

    pub(crate) fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn spinner(&self, message: String) {
        self.bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        self.bar.set_message(message);
        self.bar.enable_steady_tick(Duration::from_millis(100));
    }
}

impl RelayObserver for TerminalProgress {
    fn notify(&self, event: &RelayEvent) {
        match event {
            RelayEvent::Resolved {
                filename,
                mime_type,
            } => {
                self.bar
                    .set_message(format!("Downloading `{filename}` ({mime_type})"));
            }
            RelayEvent::DownloadStarted {
                total: Some(total),
            } if *total > 0 => {
                self.bar.disable_steady_tick();
                self.bar.set_length(100);
                self.bar.set_position(0);
                self.bar.set_style(
                    ProgressStyle::with_template("{msg} [{bar:40}] {pos}%")
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
            }
            RelayEvent::DownloadStarted { .. } => {
                self.bar.set_style(
                    ProgressStyle::with_template("{spinner} {msg} {bytes}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                self.bar.enable_steady_tick(Duration::from_millis(100));
            }
            RelayEvent::Progress(TransferProgress::Percent(percent)) => {
                self.bar.set_position(u64::from(*percent));
            }
            RelayEvent::Progress(TransferProgress::Indeterminate { bytes }) => {
                self.bar.set_position(*bytes);
            }
            RelayEvent::Downloaded { bytes } => {
                self.bar.println(format!("Downloaded {bytes} bytes"));
            }
            RelayEvent::UploadStarted => self.spinner("Uploading to Drime...".to_string()),
            RelayEvent::Uploaded { entry_id } => {
                self.bar.println(format!("Uploaded as entry {entry_id}"));
            }
            RelayEvent::LinkRequested => self.spinner("Creating shareable link...".to_string()),
        }
    }
}
